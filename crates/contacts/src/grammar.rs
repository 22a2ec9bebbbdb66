//! Line-level vCard grammar.
//!
//! Handles the parts of RFC 6350 (and its 2.1/3.0 ancestors) that do not care
//! which property is being read: line unfolding, splitting a content line
//! into group, name, parameters and value, and value unescaping.

/// Undo line folding: a line break followed by a single space or tab is a
/// continuation of the previous line.
///
/// 2.1 quoted-printable values also continue on the next line when they end
/// in a soft break (`=`); the `=` is dropped and the value stays encoded.
pub fn unfold(raw: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for line in raw.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(previous) = lines.last_mut() {
            if let Some(rest) = line.strip_prefix([' ', '\t']) {
                previous.push_str(rest);
                continue;
            }
            if has_soft_break(previous) && !line.trim().eq_ignore_ascii_case("END:VCARD") {
                previous.pop();
                previous.push_str(line);
                continue;
            }
        }
        lines.push(line.to_string());
    }
    lines
}

fn has_soft_break(line: &str) -> bool {
    if !line.ends_with('=') {
        return false;
    }
    find_unquoted(line, ':').is_some_and(|colon| {
        line[..colon]
            .to_ascii_uppercase()
            .contains("QUOTED-PRINTABLE")
    })
}

/// One property parameter, e.g. `TYPE=home,cell` or a bare 2.1 `HOME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Upper-cased parameter name, `None` for bare tokens
    pub name: Option<String>,
    pub values: Vec<String>,
}

/// A parsed content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    pub group: Option<String>,
    /// Upper-cased property name
    pub name: String,
    pub params: Vec<Param>,
    /// Raw value, still escaped
    pub value: String,
}

impl ContentLine {
    /// Split `[group.]NAME[;param...]:value`.
    ///
    /// Colons and semicolons inside double quotes belong to a parameter value.
    pub fn parse(line: &str) -> Result<Self, String> {
        let colon = find_unquoted(line, ':').ok_or_else(|| "missing ':'".to_string())?;
        let (head, value) = (&line[..colon], &line[colon + 1..]);

        let mut parts = split_unquoted(head, ';').into_iter();
        let qualified = parts.next().unwrap_or_default().trim();
        if qualified.is_empty() {
            return Err("empty property name".to_string());
        }
        let (group, name) = match qualified.rsplit_once('.') {
            Some((group, name)) => (Some(group.to_string()), name),
            None => (None, qualified),
        };
        if name.is_empty() {
            return Err("empty property name".to_string());
        }

        let params = parts
            .filter(|p| !p.trim().is_empty())
            .map(|p| parse_param(p.trim()))
            .collect();

        Ok(Self {
            group,
            name: name.to_ascii_uppercase(),
            params,
            value: value.to_string(),
        })
    }

    /// Descriptive parameters of the entry, upper-cased, in card order.
    ///
    /// `TYPE` values and bare tokens describe the entry; `PREF` is reported as
    /// `PREF` whatever its rank. Encoding and value-type parameters are not
    /// descriptions.
    pub fn descriptions(&self) -> Vec<String> {
        let mut out = Vec::new();
        for param in &self.params {
            match param.name.as_deref() {
                None | Some("TYPE") => {
                    for value in &param.values {
                        let value = value.trim();
                        if value.is_empty() {
                            continue;
                        }
                        let upper = value.to_ascii_uppercase();
                        // 2.1 puts encodings and charsets in bare tokens too
                        if param.name.is_none() && is_encoding_token(&upper) {
                            continue;
                        }
                        out.push(upper);
                    }
                }
                Some("PREF") => out.push("PREF".to_string()),
                Some(_) => {}
            }
        }
        out
    }

    /// Descriptions joined with ", "; empty when there are none.
    pub fn type_label(&self) -> String {
        self.descriptions().join(", ")
    }

    /// Value of the first parameter named `name` (upper-case), if any.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
            .and_then(|p| p.values.first())
            .map(String::as_str)
    }

    /// True when the value carries base64 data (`ENCODING=b`,
    /// `ENCODING=BASE64` or a bare 2.1 `BASE64` token).
    pub fn is_inline_binary(&self) -> bool {
        let encoded = |v: &str| v.eq_ignore_ascii_case("b") || v.eq_ignore_ascii_case("base64");
        self.params.iter().any(|p| match p.name.as_deref() {
            Some("ENCODING") => p.values.iter().any(|v| encoded(v)),
            None => p.values.iter().any(|v| v.eq_ignore_ascii_case("base64")),
            Some(_) => false,
        })
    }
}

fn is_encoding_token(token: &str) -> bool {
    matches!(
        token,
        "BASE64" | "B" | "QUOTED-PRINTABLE" | "8BIT" | "7BIT" | "INLINE" | "URL"
    )
}

fn parse_param(raw: &str) -> Param {
    match raw.split_once('=') {
        Some((name, values)) => Param {
            name: Some(name.trim().to_ascii_uppercase()),
            values: split_unquoted(values, ',')
                .into_iter()
                .map(|v| v.trim().trim_matches('"').to_string())
                .flat_map(|v| {
                    // TYPE="home,voice" is one quoted list in 4.0
                    v.split(',').map(str::to_string).collect::<Vec<_>>()
                })
                .collect(),
        },
        None => Param {
            name: None,
            values: vec![raw.to_string()],
        },
    }
}

fn find_unquoted(s: &str, needle: char) -> Option<usize> {
    let mut quoted = false;
    for (idx, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            c if c == needle && !quoted => return Some(idx),
            _ => {}
        }
    }
    None
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (idx, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            c if c == sep && !quoted => {
                parts.push(&s[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Resolve `\n`, `\N`, `\,`, `\;` and `\\`.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Split a structured or list value on `sep`, ignoring escaped separators,
/// and unescape each component.
pub fn split_escaped(value: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(unescape(&current));
            current.clear();
        } else {
            current.push(c);
        }
    }
    if escaped {
        current.push('\\');
    }
    parts.push(unescape(&current));
    parts
}
