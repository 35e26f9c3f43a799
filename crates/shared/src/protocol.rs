use serde::{Deserialize, Serialize};

use crate::domain::{AlgoCommand, ProductCommand, ProductId};

/// Empty acknowledgement returned by every control command; serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {}

pub fn algos_route() -> &'static str {
    "/algos"
}

pub fn healthz_route() -> &'static str {
    "/healthz"
}

/// Path segments for an algorithm command, relative to the server root.
pub fn algo_command_segments(algo_name: &str, command: AlgoCommand) -> [String; 3] {
    [
        "algos".to_string(),
        algo_name.to_string(),
        command.verb().to_string(),
    ]
}

pub fn product_command_segments(
    algo_name: &str,
    product_id: ProductId,
    command: ProductCommand,
) -> [String; 4] {
    [
        "algos".to_string(),
        algo_name.to_string(),
        product_id.to_string(),
        command.verb().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_is_an_empty_object() {
        assert_eq!(serde_json::to_string(&Ack::default()).expect("json"), "{}");
        let parsed: Ack = serde_json::from_str("{}").expect("parse");
        assert_eq!(parsed, Ack {});
    }

    #[test]
    fn command_segments_follow_rest_layout() {
        assert_eq!(
            algo_command_segments("LSE_0", AlgoCommand::Unpause),
            ["algos", "LSE_0", "unpause"].map(String::from)
        );
        assert_eq!(
            product_command_segments("LSE_1", ProductId(3), ProductCommand::Pause),
            ["algos", "LSE_1", "3", "pause"].map(String::from)
        );
    }
}
