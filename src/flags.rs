use crate::error::ShellError;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Flags {
    flags: BTreeMap<String, Flag>,
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub short: String,
    pub long: String,
    pub description: String,
    pub set: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        let mut flags = BTreeMap::new();

        let table = [
            ("help", "-h", "--help", "Print this help message"),
            ("version", "-v", "--version", "Show version information"),
            ("quiet", "-q", "--quiet", "Suppress non-essential diagnostics"),
            ("debug", "-d", "--debug", "Enable debug logging on stderr"),
        ];

        for (name, short, long, description) in table {
            flags.insert(
                name.to_string(),
                Flag {
                    short: short.to_string(),
                    long: long.to_string(),
                    description: description.to_string(),
                    set: false,
                },
            );
        }

        Flags { flags }
    }

    pub fn parse(&mut self, args: &[String]) -> Result<(), ShellError> {
        for arg in args {
            let flag = self
                .flags
                .values_mut()
                .find(|flag| arg == &flag.short || arg == &flag.long)
                .ok_or_else(|| ShellError::FlagError(format!("unknown option {}", arg)))?;
            flag.set = true;
        }
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags.get(name).is_some_and(|f| f.set)
    }

    pub fn print_help(&self) {
        println!("Usage: smallsh [OPTIONS]");
        println!("\nOptions:");
        for flag in self.flags.values() {
            println!("  {}, {:<15} {}", flag.short, flag.long, flag.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_short_and_long_flags() {
        let mut flags = Flags::new();
        flags.parse(&args(&["-d", "--quiet"])).unwrap();

        assert!(flags.is_set("debug"));
        assert!(flags.is_set("quiet"));
        assert!(!flags.is_set("help"));
        assert!(!flags.is_set("version"));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let mut flags = Flags::new();
        let result = flags.parse(&args(&["--config"]));
        assert!(matches!(result, Err(ShellError::FlagError(_))));
    }

    #[test]
    fn test_unregistered_name_is_unset() {
        let flags = Flags::default();
        assert!(!flags.is_set("nonexistent"));
    }
}
