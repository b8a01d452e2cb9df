pub fn validate_prefix(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() {
        return Err("name prefix must be non-empty".to_string());
    }
    let mut chars = prefix.chars();
    let first = chars.next().unwrap_or('_');
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(format!(
            "invalid name prefix start (must be [A-Za-z_]): {prefix:?}"
        ));
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!(
                "invalid name prefix char (allowed [A-Za-z0-9_]): {prefix:?}"
            ));
        }
    }
    Ok(())
}
