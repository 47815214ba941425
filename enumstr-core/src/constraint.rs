//! Go build constraints: `//go:build` expressions, legacy `// +build` lines
//! and `_GOOS` / `_GOARCH` file name suffixes.

use std::collections::HashSet;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// Highest `go1.N` release tag considered satisfied.
const MAX_GO_MINOR: u32 = 23;

/// Target description used to decide which files take part in the build.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub goos: String,
    pub goarch: String,
    tags: HashSet<String>,
}

impl BuildContext {
    /// Context for an explicit GOOS/GOARCH pair.
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
            tags: HashSet::new(),
        }
    }

    /// Context describing the machine enumstr runs on.
    pub fn host() -> Self {
        let goos = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let little = cfg!(target_endian = "little");
        let goarch = match std::env::consts::ARCH {
            "x86" => "386",
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "loongarch64" => "loong64",
            "powerpc" => "ppc",
            "powerpc64" if little => "ppc64le",
            "powerpc64" => "ppc64",
            "mips" if little => "mipsle",
            "mips64" if little => "mips64le",
            "wasm32" => "wasm",
            other => other,
        };
        Self::new(goos, goarch)
    }

    /// Adds user-supplied build tags.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Reports whether a single build tag is satisfied.
    pub fn matches_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch || self.tags.contains(tag) {
            return true;
        }
        match tag {
            "gc" | "cgo" => true,
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            _ => tag
                .strip_prefix("go1.")
                .and_then(|minor| minor.parse::<u32>().ok())
                .is_some_and(|minor| minor >= 1 && minor <= MAX_GO_MINOR),
        }
    }

    /// Applies the `name_GOOS_GOARCH.go` convention to a file name.
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = file_name.strip_suffix(".go").unwrap_or(file_name);
        let Some(idx) = stem.find('_') else {
            return true;
        };
        let parts: Vec<&str> = stem[idx..].split('_').collect();
        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return parts[n - 2] == self.goos && parts[n - 1] == self.goarch;
        }
        let last = parts[n - 1];
        if KNOWN_OS.contains(&last) {
            return last == self.goos;
        }
        if KNOWN_ARCH.contains(&last) {
            return last == self.goarch;
        }
        true
    }

    /// Evaluates the constraint lines in the header of a Go file.
    ///
    /// A `//go:build` line takes precedence over `// +build` lines. Returns
    /// the 1-indexed line and a message when a constraint is malformed.
    pub fn matches_source(&self, source: &str) -> Result<bool, (usize, String)> {
        let mut go_build: Option<(usize, &str)> = None;
        let mut plus_build: Vec<(usize, &str)> = Vec::new();
        let mut in_block = false;

        for (idx, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if in_block {
                in_block = !line.contains("*/");
                continue;
            }
            if line.is_empty() {
                continue;
            }
            if line.starts_with("/*") {
                in_block = !line.contains("*/");
                continue;
            }
            let Some(comment) = line.strip_prefix("//") else {
                break;
            };
            if let Some(expr) = comment.strip_prefix("go:build") {
                if go_build.is_some() {
                    return Err((idx + 1, "multiple //go:build lines".to_string()));
                }
                go_build = Some((idx + 1, expr));
            } else if let Some(expr) = comment.trim_start().strip_prefix("+build") {
                plus_build.push((idx + 1, expr));
            }
        }

        if let Some((line, expr)) = go_build {
            return Expr::parse(expr)
                .map(|e| e.eval(self))
                .map_err(|msg| (line, msg));
        }
        Ok(plus_build.iter().all(|(_, expr)| self.matches_plus_build(expr)))
    }

    /// `// +build a,b c` means (a AND b) OR c.
    fn matches_plus_build(&self, expr: &str) -> bool {
        expr.split_whitespace().any(|clause| {
            clause.split(',').all(|term| match term.strip_prefix('!') {
                Some(tag) => !self.matches_tag(tag),
                None => self.matches_tag(term),
            })
        })
    }
}

/// Parsed `//go:build` expression.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn parse(text: &str) -> Result<Expr, String> {
        let tokens = tokenize(text)?;
        let mut parser = ExprParser { tokens, pos: 0 };
        let expr = parser.or()?;
        if parser.pos != parser.tokens.len() {
            return Err(format!("unexpected token in build constraint: {}", text.trim()));
        }
        Ok(expr)
    }

    fn eval(&self, ctx: &BuildContext) -> bool {
        match self {
            Expr::Tag(tag) => ctx.matches_tag(tag),
            Expr::Not(inner) => !inner.eval(ctx),
            Expr::And(a, b) => a.eval(ctx) && b.eval(ctx),
            Expr::Or(a, b) => a.eval(ctx) || b.eval(ctx),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Tag(String),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '!' => {
                chars.next();
                tokens.push(Token::Not);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '&' | '|' => {
                chars.next();
                if chars.next() != Some(c) {
                    return Err(format!("invalid operator in build constraint: {}", c));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            c if c.is_alphanumeric() || c == '_' || c == '.' => {
                let mut tag = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' {
                        tag.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Tag(tag));
            }
            other => return Err(format!("invalid character in build constraint: {:?}", other)),
        }
    }
    if tokens.is_empty() {
        return Err("empty build constraint".to_string());
    }
    Ok(tokens)
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn or(&mut self) -> Result<Expr, String> {
        let mut left = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            left = Expr::Or(Box::new(left), Box::new(self.and()?));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, String> {
        let mut left = self.not()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            left = Expr::And(Box::new(left), Box::new(self.not()?));
        }
        Ok(left)
    }

    fn not(&mut self) -> Result<Expr, String> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        match token {
            Some(Token::Not) => Ok(Expr::Not(Box::new(self.not()?))),
            Some(Token::LParen) => {
                let inner = self.or()?;
                if self.peek() != Some(&Token::RParen) {
                    return Err("missing ) in build constraint".to_string());
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(Token::Tag(tag)) => Ok(Expr::Tag(tag)),
            Some(other) => Err(format!("unexpected {:?} in build constraint", other)),
            None => Err("unexpected end of build constraint".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux() -> BuildContext {
        BuildContext::new("linux", "amd64")
    }

    #[test]
    fn test_file_name_suffixes() {
        let ctx = linux();
        assert!(ctx.matches_file_name("color.go"));
        assert!(ctx.matches_file_name("color_linux.go"));
        assert!(!ctx.matches_file_name("color_windows.go"));
        assert!(ctx.matches_file_name("color_amd64.go"));
        assert!(!ctx.matches_file_name("color_arm64.go"));
        assert!(ctx.matches_file_name("color_linux_amd64.go"));
        assert!(!ctx.matches_file_name("color_linux_arm64.go"));
        // Unknown suffix is an ordinary name.
        assert!(ctx.matches_file_name("color_table.go"));
        // A bare OS name without underscore is not a suffix.
        assert!(ctx.matches_file_name("windows.go"));
    }

    #[test]
    fn test_go_build_expressions() {
        let ctx = linux();
        assert_eq!(ctx.matches_source("//go:build linux\n\npackage p\n"), Ok(true));
        assert_eq!(ctx.matches_source("//go:build !linux\n\npackage p\n"), Ok(false));
        assert_eq!(
            ctx.matches_source("//go:build (darwin || linux) && amd64\n\npackage p\n"),
            Ok(true)
        );
        assert_eq!(ctx.matches_source("//go:build ignore\n\npackage p\n"), Ok(false));
        assert_eq!(ctx.matches_source("//go:build unix && go1.18\n\npackage p\n"), Ok(true));
    }

    #[test]
    fn test_user_tags() {
        let ctx = linux().with_tags(["integration"]);
        assert_eq!(
            ctx.matches_source("//go:build integration\n\npackage p\n"),
            Ok(true)
        );
    }

    #[test]
    fn test_plus_build_lines() {
        let ctx = linux();
        assert_eq!(
            ctx.matches_source("// +build darwin linux,amd64\n\npackage p\n"),
            Ok(true)
        );
        assert_eq!(ctx.matches_source("// +build !linux\n\npackage p\n"), Ok(false));
        // go:build wins over +build.
        assert_eq!(
            ctx.matches_source("//go:build linux\n// +build windows\n\npackage p\n"),
            Ok(true)
        );
    }

    #[test]
    fn test_constraints_after_package_clause_ignored() {
        let ctx = linux();
        assert_eq!(ctx.matches_source("package p\n\n//go:build ignore\n"), Ok(true));
    }

    #[test]
    fn test_block_comment_header() {
        let ctx = linux();
        let src = "/* license\n   text */\n//go:build windows\n\npackage p\n";
        assert_eq!(ctx.matches_source(src), Ok(false));
    }

    #[test]
    fn test_malformed_expression() {
        let ctx = linux();
        let err = ctx.matches_source("\n//go:build linux &&\n\npackage p\n").unwrap_err();
        assert_eq!(err.0, 2);
        assert!(ctx.matches_source("//go:build (linux\npackage p\n").is_err());
        assert!(ctx.matches_source("//go:build linux & amd64\npackage p\n").is_err());
    }
}
