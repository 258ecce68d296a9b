use fleetgate_action::{AwaitUpAction, AwaitUpOptions};
use fleetgate_core::FleetConfig;

use crate::AwaitArgs;

pub async fn run(
    config: &FleetConfig,
    stable_time: Option<&str>,
    args: &AwaitArgs,
) -> anyhow::Result<()> {
    let source = super::source(config)?;
    let options = AwaitUpOptions {
        delay: super::flag_duration("delay", args.delay.as_deref())?,
        state_time: super::flag_duration("state-time", args.state_time.as_deref())?,
        constant_time: super::flag_duration("constant-time", args.constant_time.as_deref())?,
        stable_time: super::flag_duration("stable-time", stable_time)?,
        await_time: super::flag_duration("await-time", args.await_time.as_deref())?,
        verbose: args.quiet.then_some(false),
    };

    let mut action = AwaitUpAction::new(source).with_options(options);
    if let Some(settings) = config.await_up() {
        action = action.with_settings(settings.clone());
    }

    let result = action.perform(&config.instances()).await?;
    super::print_result(&result, &args.format)
}
