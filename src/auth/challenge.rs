//! `WWW-Authenticate` / `Proxy-Authenticate` challenge parsing.

use std::collections::HashMap;

/// A single authentication challenge, e.g. `Digest realm="dav", nonce="…"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Lowercased scheme name.
    pub scheme: String,
    /// Parameters keyed by lowercased name.
    pub params: HashMap<String, String>,
}

impl Challenge {
    fn new(scheme: &str) -> Self {
        Self {
            scheme: scheme.to_ascii_lowercase(),
            params: HashMap::new(),
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn realm(&self) -> Option<&str> {
        self.param("realm")
    }

    pub fn is_basic(&self) -> bool {
        self.scheme == "basic"
    }

    pub fn is_digest(&self) -> bool {
        self.scheme == "digest"
    }
}

/// Parse every challenge in a set of header values. One value may carry
/// several comma-separated challenges.
pub fn parse_challenges<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<Challenge> {
    values.into_iter().flat_map(parse_header_value).collect()
}

/// Pick the challenge to answer: Digest over Basic, anything else ignored.
pub fn preferred(challenges: &[Challenge]) -> Option<&Challenge> {
    challenges
        .iter()
        .find(|c| c.is_digest())
        .or_else(|| challenges.iter().find(|c| c.is_basic()))
}

fn parse_header_value(value: &str) -> Vec<Challenge> {
    let mut cursor = Cursor::new(value);
    let mut challenges = Vec::new();
    let mut current: Option<Challenge> = None;

    loop {
        cursor.skip_separators();
        if cursor.at_end() {
            break;
        }

        let token = cursor.read_token();
        if token.is_empty() {
            // Unparseable byte; skip it rather than loop forever.
            cursor.advance();
            continue;
        }

        cursor.skip_whitespace();
        if cursor.peek() == Some('=') {
            cursor.advance();
            cursor.skip_whitespace();
            let value = cursor.read_value();
            if let Some(challenge) = current.as_mut() {
                challenge.params.insert(token.to_ascii_lowercase(), value);
            }
        } else {
            if let Some(done) = current.take() {
                challenges.push(done);
            }
            current = Some(Challenge::new(&token));
        }
    }

    if let Some(done) = current {
        challenges.push(done);
    }
    challenges
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace() || c == ',') {
            self.advance();
        }
    }

    fn read_token(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && c != '=' && c != ',' && c != '"')
        {
            self.advance();
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn read_value(&mut self) -> String {
        if self.peek() != Some('"') {
            return self.read_token();
        }

        self.advance();
        let mut value = String::new();
        while let Some(c) = self.peek() {
            self.advance();
            match c {
                '"' => break,
                '\\' => {
                    if let Some(escaped) = self.peek() {
                        value.push(escaped);
                        self.advance();
                    }
                }
                _ => value.push(c),
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_digest() {
        let challenges = parse_challenges([
            r#"Digest realm="dav@nas", qop="auth,auth-int", nonce="abc123", opaque="xyz", algorithm=MD5"#,
        ]);
        assert_eq!(challenges.len(), 1);
        let digest = &challenges[0];
        assert!(digest.is_digest());
        assert_eq!(digest.realm(), Some("dav@nas"));
        assert_eq!(digest.param("qop"), Some("auth,auth-int"));
        assert_eq!(digest.param("nonce"), Some("abc123"));
        assert_eq!(digest.param("algorithm"), Some("MD5"));
    }

    #[test]
    fn test_parse_multiple_in_one_value() {
        let challenges = parse_challenges([r#"Basic realm="a", Digest realm="b", nonce="n""#]);
        assert_eq!(challenges.len(), 2);
        assert!(challenges[0].is_basic());
        assert_eq!(challenges[0].realm(), Some("a"));
        assert!(challenges[1].is_digest());
        assert_eq!(challenges[1].param("nonce"), Some("n"));
    }

    #[test]
    fn test_preferred_picks_digest() {
        let challenges = parse_challenges([r#"Basic realm="a""#, r#"Digest realm="b", nonce="n""#]);
        assert!(preferred(&challenges).unwrap().is_digest());

        let basic_only = parse_challenges([r#"Basic realm="a""#]);
        assert!(preferred(&basic_only).unwrap().is_basic());

        let unknown = parse_challenges(["Bearer"]);
        assert!(preferred(&unknown).is_none());
    }

    #[test]
    fn test_quoted_escape_and_case() {
        let challenges = parse_challenges([r#"DIGEST Realm="say \"hi\"", NONCE=plain"#]);
        assert_eq!(challenges[0].scheme, "digest");
        assert_eq!(challenges[0].realm(), Some(r#"say "hi""#));
        assert_eq!(challenges[0].param("nonce"), Some("plain"));
    }
}
