use crate::script::Command;
use log::debug;
use neptune_id_pool::IdPool;
use std::io::Write;

pub fn run<W: Write>(
    pool: &mut IdPool,
    commands: &[(usize, Command)],
    check_each: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    for (line, command) in commands {
        debug!("line {}: {:?}", line, command);
        match *command {
            Command::Create => match pool.create_id() {
                Some(id) => writeln!(out, "create -> {}", id)?,
                None => writeln!(out, "create -> full")?,
            },
            Command::CreateRange(count) => match pool.create_range_id(count) {
                Some(first) => writeln!(out, "create_range {} -> {}", count, first)?,
                None => writeln!(out, "create_range {} -> full", count)?,
            },
            Command::Destroy { id, count } => match pool.destroy_range_id(id, count) {
                Ok(()) => writeln!(out, "destroy {} {} -> ok", id, count)?,
                Err(err) => writeln!(out, "destroy {} {} -> rejected: {}", id, count, err)?,
            },
            Command::DestroyAll => {
                pool.destroy_all();
                writeln!(out, "destroy_all")?;
            }
            Command::Available(count) => writeln!(
                out,
                "available {} -> {}",
                count,
                pool.is_range_available(count)
            )?,
            Command::Print => writeln!(out, "{}", pool)?,
            Command::Check => {
                pool.check_ranges();
                writeln!(out, "check -> ok")?;
            }
        }

        if check_each {
            pool.check_ranges();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;

    fn replay(size: u32, script: &str) -> String {
        let mut pool = IdPool::new(size);
        let commands = parse_script(script).unwrap();
        let mut out = Vec::new();
        run(&mut pool, &commands, true, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn replays_coalescing_session() {
        let output = replay(
            10,
            "
            create_range 10
            print
            destroy 3
            destroy 4
            print
            available 2
            available 3
            ",
        );
        assert_eq!(
            output,
            "create_range 10 -> 0\n\
             -\n\
             destroy 3 1 -> ok\n\
             destroy 4 1 -> ok\n\
             3-4\n\
             available 2 -> true\n\
             available 3 -> false\n"
        );
    }

    #[test]
    fn reports_rejected_frees() {
        let output = replay(10, "destroy 2\ndestroy 9 2\n");
        assert_eq!(
            output,
            "destroy 2 1 -> rejected: Range 2+1 overlaps ids that are already free\n\
             destroy 9 2 -> rejected: Range 9+2 is outside of the pool (capacity 10)\n"
        );
    }

    #[test]
    fn reports_exhaustion_and_reset() {
        let output = replay(1, "create\ncreate\ndestroy_all\ncreate\ncheck\n");
        assert_eq!(
            output,
            "create -> 0\ncreate -> full\ndestroy_all\ncreate -> 0\ncheck -> ok\n"
        );
    }
}
