//! Platform tag used as the final fingerprint component (spec §4.A, step 5).

/// Returns the `os-arch` tag for the current platform, e.g. `"linux-x86_64"`.
#[must_use]
pub fn tag() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_contains_a_separator() {
        assert!(tag().contains('-'));
    }
}
