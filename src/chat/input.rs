//! Classification of one line of user input.

/// What to do with a line read at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Blank line; prompt again.
    Skip,
    /// `quit` or `exit`, any case.
    Exit,
    /// Trimmed text to send to the agent.
    Message(String),
}

pub fn classify_input(line: &str) -> InputAction {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        InputAction::Skip
    } else if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
        InputAction::Exit
    } else {
        InputAction::Message(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(classify_input(""), InputAction::Skip);
        assert_eq!(classify_input("  \t\n"), InputAction::Skip);
    }

    #[test]
    fn exit_sentinels_ignore_case_and_padding() {
        for line in ["quit", "QUIT", " Exit\n", "eXiT"] {
            assert_eq!(classify_input(line), InputAction::Exit, "{line:?}");
        }
        assert_eq!(
            classify_input("quit now"),
            InputAction::Message("quit now".into())
        );
    }

    #[test]
    fn messages_are_trimmed() {
        assert_eq!(
            classify_input("  scrape https://example.com \r\n"),
            InputAction::Message("scrape https://example.com".into())
        );
    }
}
