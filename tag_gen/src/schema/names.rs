/* Identifier rules for generated code. */

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro", "override",
    "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Lower-case member identifier for a display name.
pub fn member_name(name: &str) -> String {
    let mut ident: String = name
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '\''))
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// UPPER_SNAKE prefix for the constants of an enum or bitfield type.
pub fn constant_prefix(type_name: &str) -> String {
    let folded = type_name
        .replace("UI", "Ui")
        .replace("GBX", "Gbx")
        .replace("HUD", "Hud");
    let mut out = String::new();
    for c in folded.chars() {
        if !out.is_empty() && c.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

/// Constant name for one enum option or bitfield flag.
pub fn option_constant(prefix: &str, option: &str) -> String {
    let member = member_name(option);
    format!("{prefix}_{}", member.trim_end_matches('_').trim_start_matches('_').to_uppercase())
}
