use anyhow::{anyhow, bail, Context};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Create,
    CreateRange(u32),
    Destroy { id: u32, count: u32 },
    DestroyAll,
    Available(u32),
    Print,
    Check,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let args: Vec<u32> = words
            .map(|word| {
                word.parse::<u32>()
                    .with_context(|| format!("invalid number {:?}", word))
            })
            .collect::<anyhow::Result<_>>()?;

        let command = match (name, args.as_slice()) {
            ("create", []) => Command::Create,
            ("create_range", [count]) => Command::CreateRange(*count),
            ("destroy", [id]) => Command::Destroy { id: *id, count: 1 },
            ("destroy", [id, count]) => Command::Destroy {
                id: *id,
                count: *count,
            },
            ("destroy_all", []) => Command::DestroyAll,
            ("available", [count]) => Command::Available(*count),
            ("print", []) => Command::Print,
            ("check", []) => Command::Check,
            (
                "create" | "create_range" | "destroy" | "destroy_all" | "available" | "print"
                | "check",
                _,
            ) => bail!("wrong number of arguments for {:?}", name),
            _ => bail!("unknown command {:?}", name),
        };
        Ok(command)
    }
}

/// Parses a whole script into `(line number, command)` pairs, skipping blank lines and
/// `#` comments.
pub fn parse_script(source: &str) -> anyhow::Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line = match line.split_once('#') {
            Some((code, _comment)) => code,
            None => line,
        }
        .trim();

        if line.is_empty() {
            continue;
        }

        let command = line
            .parse::<Command>()
            .with_context(|| format!("line {}: {:?}", index + 1, line))?;
        commands.push((index + 1, command));
    }
    Ok(commands)
}
