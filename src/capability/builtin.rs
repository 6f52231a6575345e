//! Capabilities that need no external backend.

use super::{Capability, CapabilityProvider};
use crate::error::CapabilityError;
use crate::value::{Value, Variables};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// `wait`: sleep for `duration` seconds.
#[derive(Debug, Default)]
pub struct Wait;

impl Capability for Wait {
    fn action_name(&self) -> &str {
        "wait"
    }

    fn execute(&self, params: &Variables) -> Result<Value, CapabilityError> {
        let seconds = params
            .get("duration")
            .and_then(Value::as_f64)
            .ok_or("wait requires a numeric 'duration' parameter (seconds)")?;
        let duration = Duration::try_from_secs_f64(seconds)
            .map_err(|e| format!("invalid wait duration {seconds}: {e}"))?;
        std::thread::sleep(duration);
        Ok(Value::Null)
    }
}

/// `log.message`: emit the `message` parameter as an info event.
#[derive(Debug, Default)]
pub struct LogMessage;

impl Capability for LogMessage {
    fn action_name(&self) -> &str {
        "log.message"
    }

    fn execute(&self, params: &Variables) -> Result<Value, CapabilityError> {
        let message = params
            .get("message")
            .filter(|v| !v.is_null())
            .ok_or("log.message requires a 'message' parameter")?;
        info!(target: "playbook", "{}", message);
        Ok(Value::Null)
    }
}

/// Provider for every built-in capability.
#[derive(Debug, Default)]
pub struct BuiltinProvider;

impl CapabilityProvider for BuiltinProvider {
    fn capabilities(&self) -> Vec<Arc<dyn Capability>> {
        vec![Arc::new(Wait), Arc::new(LogMessage)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, Value)]) -> Variables {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn wait_accepts_numeric_strings() {
        let result = Wait.execute(&params(&[("duration", Value::from("0"))]));
        assert_eq!(result.unwrap(), Value::Null);
    }

    #[test]
    fn wait_requires_duration() {
        let err = Wait.execute(&Variables::new()).unwrap_err();
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn wait_rejects_negative_duration() {
        assert!(Wait.execute(&params(&[("duration", Value::Float(-1.0))])).is_err());
    }

    #[test]
    fn log_message_requires_message() {
        assert!(LogMessage.execute(&Variables::new()).is_err());
        assert!(LogMessage
            .execute(&params(&[("message", Value::from("hi"))]))
            .is_ok());
    }

    #[test]
    fn provider_offers_all_builtins() {
        let names: Vec<String> = BuiltinProvider
            .capabilities()
            .iter()
            .map(|c| c.action_name().to_string())
            .collect();
        assert_eq!(names, vec!["wait", "log.message"]);
    }
}
