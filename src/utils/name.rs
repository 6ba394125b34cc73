use crate::models::error::SError;
use regex::Regex;

/// Strips characters that are not allowed in a mod folder name.
pub fn sanitize_mod_name(raw: &str) -> Result<String, SError> {
    let re = Regex::new(r#"[/:*?"<>|]"#)?;
    Ok(re.replace_all(raw.trim(), "").into_owned())
}

/// Modpack file prefixes use underscores instead of spaces.
pub fn file_prefix(name: &str) -> String {
    name.replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_forbidden_characters() {
        assert_eq!(
            sanitize_mod_name(r#"Goku: "Ultra" <Instinct>?"#).unwrap(),
            "Goku Ultra Instinct"
        );
        assert_eq!(sanitize_mod_name("a/b|c*d").unwrap(), "abcd");
    }

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_mod_name("  Vegeta_Skin-v2 ").unwrap(), "Vegeta_Skin-v2");
    }

    #[test]
    fn test_file_prefix() {
        assert_eq!(file_prefix("My Cool Pack"), "My_Cool_Pack");
    }
}
