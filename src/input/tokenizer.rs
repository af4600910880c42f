use thiserror::Error;

const INPUT_MARKER: char = '<';
const OUTPUT_MARKER: char = '>';
const BACKGROUND_MARKER: char = '&';
const COMMENT_MARKER: char = '#';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error: expected a path after '{0}'")]
    MissingRedirectTarget(char),
    #[error("syntax error: '{0}' given more than once")]
    DuplicateRedirect(char),
}

/// One parsed input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub argv: Vec<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub background: bool,
}

impl Command {
    /// Splits `line` into a command. Blank lines and comments yield `None`.
    ///
    /// A token containing `<` or `>` takes the next token as its path, and a
    /// token containing `&` ends the line; anything after it is dropped.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
            return Ok(None);
        }

        let mut command = Command::default();
        let mut tokens = trimmed.split_whitespace();

        while let Some(token) = tokens.next() {
            if token.contains(INPUT_MARKER) {
                let path = Self::redirect_target(&mut tokens, INPUT_MARKER)?;
                Self::set_once(&mut command.input_path, path, INPUT_MARKER)?;
            } else if token.contains(OUTPUT_MARKER) {
                let path = Self::redirect_target(&mut tokens, OUTPUT_MARKER)?;
                Self::set_once(&mut command.output_path, path, OUTPUT_MARKER)?;
            } else if token.contains(BACKGROUND_MARKER) {
                command.background = true;
                break;
            } else {
                command.argv.push(token.to_string());
            }
        }

        Ok(Some(command))
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    fn redirect_target<'a>(
        tokens: &mut impl Iterator<Item = &'a str>,
        marker: char,
    ) -> Result<String, ParseError> {
        tokens
            .next()
            .map(str::to_string)
            .ok_or(ParseError::MissingRedirectTarget(marker))
    }

    fn set_once(slot: &mut Option<String>, path: String, marker: char) -> Result<(), ParseError> {
        if slot.is_some() {
            return Err(ParseError::DuplicateRedirect(marker));
        }
        *slot = Some(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_plain_words() {
        let command = parse("ls -la   /tmp");
        assert_eq!(command.argv, vec!["ls", "-la", "/tmp"]);
        assert_eq!(command.program(), Some("ls"));
        assert_eq!(command.args(), &["-la".to_string(), "/tmp".to_string()]);
        assert!(command.input_path.is_none());
        assert!(command.output_path.is_none());
        assert!(!command.background);
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse(" \t "), Ok(None));
        assert_eq!(Command::parse("# echo hi"), Ok(None));
        assert_eq!(Command::parse("   #indented comment"), Ok(None));
    }

    #[test]
    fn test_redirections_are_not_arguments() {
        let command = parse("sort < in.txt > out.txt");
        assert_eq!(command.argv, vec!["sort"]);
        assert_eq!(command.input_path.as_deref(), Some("in.txt"));
        assert_eq!(command.output_path.as_deref(), Some("out.txt"));
    }

    #[test]
    fn test_redirection_order_does_not_matter() {
        let command = parse("wc > out -l < in");
        assert_eq!(command.argv, vec!["wc", "-l"]);
        assert_eq!(command.input_path.as_deref(), Some("in"));
        assert_eq!(command.output_path.as_deref(), Some("out"));
    }

    #[test]
    fn test_background_marker_ends_the_line() {
        let command = parse("sleep 5 & ignored tokens");
        assert_eq!(command.argv, vec!["sleep", "5"]);
        assert!(command.background);
    }

    #[test]
    fn test_background_with_redirection() {
        let command = parse("cat < in > out &");
        assert_eq!(command.argv, vec!["cat"]);
        assert!(command.background);
        assert_eq!(command.output_path.as_deref(), Some("out"));
    }

    #[test]
    fn test_missing_redirect_target_is_rejected() {
        assert_eq!(
            Command::parse("cat <"),
            Err(ParseError::MissingRedirectTarget('<'))
        );
        assert_eq!(
            Command::parse("echo hi >"),
            Err(ParseError::MissingRedirectTarget('>'))
        );
    }

    #[test]
    fn test_duplicate_redirect_is_rejected() {
        assert_eq!(
            Command::parse("cat < a < b"),
            Err(ParseError::DuplicateRedirect('<'))
        );
        assert_eq!(
            Command::parse("echo > a > b"),
            Err(ParseError::DuplicateRedirect('>'))
        );
    }

    #[test]
    fn test_markers_only_leave_empty_argv() {
        let command = parse("&");
        assert!(command.is_empty());
        assert!(command.background);
        assert_eq!(command.program(), None);
        assert!(command.args().is_empty());
    }

    #[test]
    fn test_no_argument_count_limit() {
        let line = (0..2000).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let command = parse(&format!("echo {}", line));
        assert_eq!(command.argv.len(), 2001);
    }
}
