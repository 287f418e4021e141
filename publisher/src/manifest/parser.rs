//! Line-oriented parsing of Homebrew formula text.
//!
//! Only the structure a binary-release formula needs is recognised: the
//! class declaration, top-level `keyword "value"` stanzas (single- or
//! double-quoted), the
//! `bin.install` directive inside `def install`, and the `system`
//! invocation inside `test do`. Anything else is skipped, so a formula with
//! extra blocks still parses.

/// A top-level `keyword "value"` stanza.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stanza {
    /// The stanza keyword, e.g. `homepage`.
    pub keyword: String,
    /// The unquoted value.
    pub value: String,
    /// One-based line number.
    pub line: usize,
}

/// The `system` call made by the test block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInvocation {
    /// The executable path, e.g. `#{bin}/tool`.
    pub program: String,
    /// Arguments passed to the executable.
    pub args: Vec<String>,
}

impl TestInvocation {
    /// Return the executable name with any directory prefix removed.
    #[must_use]
    pub fn executable_name(&self) -> &str {
        self.program.rsplit('/').next().unwrap_or_default()
    }
}

/// Structural fields recovered from formula text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormulaFields {
    /// The formula class name, when a `class X < Formula` line is present.
    pub class_name: Option<String>,
    /// Top-level stanzas in order of appearance.
    pub stanzas: Vec<Stanza>,
    /// Names passed to `bin.install`, after any `=>` rename.
    pub installs: Vec<String>,
    /// The first `system` invocation in the test block.
    pub test: Option<TestInvocation>,
}

impl FormulaFields {
    /// Return every stanza with the given keyword.
    pub fn stanzas_named<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Stanza> {
        self.stanzas
            .iter()
            .filter(move |stanza| stanza.keyword == keyword)
    }

    /// Return the first stanza with the given keyword.
    #[must_use]
    pub fn stanza(&self, keyword: &str) -> Option<&Stanza> {
        self.stanzas.iter().find(|stanza| stanza.keyword == keyword)
    }
}

/// Which block the parser is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Outside,
    Class,
    Install,
    Test,
    Other,
}

/// Parse formula text into its structural fields.
///
/// # Examples
///
/// ```
/// use formula_publisher::manifest::parser::parse_formula;
///
/// let fields = parse_formula(concat!(
///     "class Tool < Formula\n",
///     "  version \"1.0.0\"\n",
///     "  def install\n",
///     "    bin.install \"tool\"\n",
///     "  end\n",
///     "end\n",
/// ));
/// assert_eq!(fields.class_name.as_deref(), Some("Tool"));
/// assert_eq!(fields.stanza("version").map(|s| s.value.as_str()), Some("1.0.0"));
/// assert_eq!(fields.installs, ["tool"]);
/// ```
#[must_use]
pub fn parse_formula(text: &str) -> FormulaFields {
    let mut fields = FormulaFields::default();
    let mut stack: Vec<Section> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        let section = stack.last().copied().unwrap_or(Section::Outside);

        if line == "end" {
            stack.pop();
            continue;
        }
        if let Some(name) = class_declaration(line) {
            fields.class_name.get_or_insert_with(|| name.to_owned());
            stack.push(Section::Class);
            continue;
        }
        if opens_block(line) {
            stack.push(match (section, line) {
                (Section::Class, "def install") => Section::Install,
                (Section::Class, "test do") => Section::Test,
                _ => Section::Other,
            });
            continue;
        }

        match section {
            Section::Class => {
                if let Some((keyword, rest)) = line.split_once(char::is_whitespace) {
                    if let Some(value) = quoted_strings(rest).into_iter().next() {
                        fields.stanzas.push(Stanza {
                            keyword: keyword.to_owned(),
                            value,
                            line: index + 1,
                        });
                    }
                }
            }
            Section::Install => {
                if let Some(rest) = line.strip_prefix("bin.install") {
                    fields.installs.extend(installed_name(rest));
                }
            }
            Section::Test => {
                if fields.test.is_none() {
                    fields.test = test_invocation(line);
                }
            }
            Section::Outside | Section::Other => {}
        }
    }
    fields
}

/// Return the class name from a `class Name < Formula` line.
fn class_declaration(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("class ")?;
    let (name, parent) = rest.split_once('<')?;
    (parent.trim() == "Formula").then_some(name.trim())
}

/// Whether `line` opens a block closed by a later `end`.
fn opens_block(line: &str) -> bool {
    line.starts_with("def ")
        || line.ends_with(" do")
        || line.contains(" do |")
        || line.starts_with("if ")
        || line.starts_with("unless ")
        || line.starts_with("begin")
}

/// The delimiter of the string literal being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Double,
    Single,
}

impl Quote {
    fn opened_by(c: char) -> Option<Self> {
        match c {
            '"' => Some(Self::Double),
            '\'' => Some(Self::Single),
            _ => None,
        }
    }

    const fn delimiter(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }

    /// Resolve the character following a backslash.
    ///
    /// Single-quoted literals only escape `\\` and `\'`; any other
    /// backslash is kept.
    fn push_escaped(self, value: &mut String, c: char) {
        if self == Self::Single && !matches!(c, '\\' | '\'') {
            value.push('\\');
        }
        value.push(c);
    }
}

/// Drop a trailing `#` comment that is not inside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut open: Option<Quote> = None;
    let mut escaped = false;
    for (index, c) in line.char_indices() {
        match open {
            None if c == '#' => return line.get(..index).unwrap_or(line),
            None => open = Quote::opened_by(c),
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(quote) if c == quote.delimiter() => open = None,
            Some(_) => {}
        }
    }
    line
}

/// Extract the contents of every single- or double-quoted string in `text`.
///
/// Backslash escapes are resolved; Ruby interpolation is kept verbatim.
fn quoted_strings(text: &str) -> Vec<String> {
    let mut strings = Vec::new();
    let mut current: Option<(Quote, String)> = None;
    let mut escaped = false;
    for c in text.chars() {
        let Some((quote, value)) = current.as_mut() else {
            current = Quote::opened_by(c).map(|quote| (quote, String::new()));
            continue;
        };
        let quote = *quote;
        if escaped {
            quote.push_escaped(value, c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote.delimiter() {
            strings.extend(current.take().map(|(_, value)| value));
        } else {
            value.push(c);
        }
    }
    strings
}

/// Return the installed name from the arguments of `bin.install`.
///
/// `bin.install "a" => "b"` installs `a` under the name `b`.
fn installed_name(args: &str) -> Option<String> {
    let mut strings = quoted_strings(args);
    if args.contains("=>") && strings.len() >= 2 {
        strings.pop()
    } else {
        strings.into_iter().next()
    }
}

/// Parse a `system "program", "arg", ...` line.
fn test_invocation(line: &str) -> Option<TestInvocation> {
    let rest = line.strip_prefix("system")?;
    if !rest.starts_with([' ', '(']) {
        return None;
    }
    let mut strings = quoted_strings(rest).into_iter();
    let program = strings.next()?;
    Some(TestInvocation {
        program,
        args: strings.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FORMULA: &str = concat!(
        "class GitCredentialNetlify < Formula\n",
        "  desc \"Git Credential Helper using Netlify's API for authentication\"\n",
        "  homepage \"https://github.com/netlify/netlify-credential-helper\"\n",
        "  url \"https://example.test/v1.0.0/tool.tar.gz\"\n",
        "  version \"1.0.0\"\n",
        "  sha256 \"abc\"\n",
        "\n",
        "  def install\n",
        "    bin.install \"git-credential-netlify\"\n",
        "  end\n",
        "\n",
        "  test do\n",
        "    system \"#{bin}/git-credential-netlify\", \"version\"\n",
        "  end\n",
        "end\n",
    );

    #[test]
    fn parses_bundled_layout() {
        let fields = parse_formula(FORMULA);
        assert_eq!(fields.class_name.as_deref(), Some("GitCredentialNetlify"));
        let keywords: Vec<_> = fields.stanzas.iter().map(|s| s.keyword.as_str()).collect();
        assert_eq!(keywords, ["desc", "homepage", "url", "version", "sha256"]);
        assert_eq!(fields.stanza("sha256").map(|s| s.line), Some(6));
        assert_eq!(fields.installs, ["git-credential-netlify"]);

        let test = fields.test.expect("test invocation");
        assert_eq!(test.program, "#{bin}/git-credential-netlify");
        assert_eq!(test.args, ["version"]);
        assert_eq!(test.executable_name(), "git-credential-netlify");
    }

    #[test]
    fn stanzas_inside_other_blocks_are_ignored() {
        let text = concat!(
            "class Tool < Formula\n",
            "  on_linux do\n",
            "    url \"https://example.test/linux.tgz\"\n",
            "  end\n",
            "  url \"https://example.test/mac.tgz\"\n",
            "end\n",
        );
        let fields = parse_formula(text);
        let urls: Vec<_> = fields.stanzas_named("url").map(|s| s.value.as_str()).collect();
        assert_eq!(urls, ["https://example.test/mac.tgz"]);
    }

    #[test]
    fn stanzas_outside_the_class_are_ignored() {
        let fields = parse_formula("version \"1.0.0\"\n");
        assert!(fields.class_name.is_none());
        assert!(fields.stanzas.is_empty());
    }

    #[rstest]
    #[case::plain(r#""tool""#, Some("tool"))]
    #[case::renamed(r#""tool-darwin" => "tool""#, Some("tool"))]
    #[case::empty("", None)]
    fn install_names(#[case] args: &str, #[case] expected: Option<&str>) {
        assert_eq!(installed_name(args).as_deref(), expected);
    }

    #[rstest]
    #[case::trailing("  url \"https://x.test/#frag\" # mirror", "  url \"https://x.test/#frag\" ")]
    #[case::interpolation("system \"#{bin}/x\"", "system \"#{bin}/x\"")]
    #[case::whole_line("# comment", "")]
    #[case::single_quoted("desc 'Tool #1' # note", "desc 'Tool #1' ")]
    #[case::apostrophe_in_double("desc \"Netlify's #1\" # note", "desc \"Netlify's #1\" ")]
    fn strips_comments_outside_strings(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(strip_comment(line), expected);
    }

    #[rstest]
    #[case::double(r#""a\"b", "c""#, vec!["a\"b", "c"])]
    #[case::single(r"'it\'s', 'c:\\tmp'", vec!["it's", "c:\\tmp"])]
    #[case::single_keeps_other_backslashes(r"'a\nb'", vec!["a\\nb"])]
    #[case::mixed(r#"'a "b"', "c 'd'""#, vec![r#"a "b""#, "c 'd'"])]
    fn quoted_strings_resolve_escapes(#[case] text: &str, #[case] expected: Vec<&str>) {
        assert_eq!(quoted_strings(text), expected);
    }

    #[test]
    fn single_quoted_stanzas_are_recognised() {
        let fields = parse_formula(concat!(
            "class Tool < Formula\n",
            "  desc 'Git credential helper #1' # trailing\n",
            "  homepage 'https://example.test/tool'\n",
            "end\n",
        ));
        assert_eq!(
            fields.stanza("desc").map(|s| s.value.as_str()),
            Some("Git credential helper #1")
        );
        assert_eq!(
            fields.stanza("homepage").map(|s| s.value.as_str()),
            Some("https://example.test/tool")
        );
    }

    #[test]
    fn system_with_parentheses_is_recognised() {
        let invocation = test_invocation(r##"system("#{bin}/tool", "version")"##).expect("parsed");
        assert_eq!(invocation.args, ["version"]);
        assert!(test_invocation("systemd \"x\"").is_none());
    }
}
