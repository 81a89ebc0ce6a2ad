use std::cell::OnceCell;

/// Settings taken from the environment at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Env {
    /// `OCTET_TRACE`: print a trace line before every instruction
    pub trace: bool,
}

thread_local! {
    /// Written once by `init`
    static ENV: OnceCell<Env> = const { OnceCell::new() };
}

impl Env {
    /// Build settings from a variable lookup, so tests need not touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Env
    where
        F: Fn(&str) -> Option<String>,
    {
        Env {
            trace: lookup("OCTET_TRACE").is_some_and(|v| is_enabled(&v)),
        }
    }
}

/// Read configuration from the environment. Call once, at startup.
pub fn init() {
    let env = Env::from_lookup(|name| std::env::var(name).ok());
    ENV.with(|cell| {
        assert!(
            cell.set(env).is_ok(),
            "tried to initialize environment state multiple times"
        );
    });
}

pub fn is_trace_enabled() -> bool {
    ENV.with(|cell| {
        cell.get()
            .unwrap_or_else(|| panic!("tried to access environment state before initialization"))
            .trace
    })
}

fn is_enabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_trace(value: &str) -> Env {
        Env::from_lookup(|name| (name == "OCTET_TRACE").then(|| value.to_string()))
    }

    #[test]
    fn trace_values() {
        for value in ["1", "true", "YES", " on "] {
            assert!(with_trace(value).trace, "{value:?}");
        }
        for value in ["0", "", "false", "2"] {
            assert!(!with_trace(value).trace, "{value:?}");
        }
        assert_eq!(Env::from_lookup(|_| None), Env::default());
    }

    #[test]
    fn init_then_read() {
        init();
        // Whatever the process environment says, the value is now fixed
        let first = is_trace_enabled();
        assert_eq!(is_trace_enabled(), first);
    }

    #[test]
    #[should_panic(expected = "before initialization")]
    fn uninitialized() {
        is_trace_enabled();
    }

    #[test]
    #[should_panic(expected = "multiple times")]
    fn initialized_twice() {
        init();
        init();
    }
}
