/// Tokens whose presence suggests the program reads standard input.
pub const STDIN_TOKENS: &[&str] = &["Scanner", "System.in", "BufferedReader", "InputStreamReader"];

/// Whether the editor should surface the stdin panel for this source.
///
/// Advisory only: stdin is forwarded to providers whatever this returns.
pub fn uses_stdin(source: &str) -> bool {
    STDIN_TOKENS.iter().any(|token| source.contains(token))
}
