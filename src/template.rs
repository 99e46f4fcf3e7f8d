//! Raw commit objects as templates with substitutable timestamps.

use {
    crate::error::{Error, Result},
    std::fmt::{self, Display, Write},
    tracing::{instrument, trace},
};

/// A Unix timestamp with its timezone offset, as written in a commit's
/// `author` or `committer` header line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp {
    /// Seconds since the Unix epoch.
    pub seconds: i64,
    /// The timezone exactly as written, e.g. `+0200`. Never interpreted.
    pub timezone: String,
}

impl Timestamp {
    /// Returns this timestamp moved `offset` seconds into the future, in the
    /// same timezone.
    #[must_use]
    pub fn shifted(&self, offset: i64) -> Self {
        Self {
            seconds: self.seconds + offset,
            timezone: self.timezone.clone(),
        }
    }
}

/// Git's date syntax, `<seconds> <timezone>`.
impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.seconds, self.timezone)
    }
}

/// The author and committer timestamps extracted from a commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimestampFields {
    /// From the `author` line.
    pub author: Timestamp,
    /// From the `committer` line.
    pub committer: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(Vec<u8>),
    AuthorTimestamp,
    CommitterTimestamp,
}

/// A commit object with its author and committer timestamps cut out.
///
/// Every other byte is kept verbatim, so rendering the template with the
/// original [`TimestampFields`] reproduces the original commit exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTemplate {
    segments: Vec<Segment>,
    len: usize,
}

/// Splits a raw commit object into a [`CommitTemplate`] and the timestamps
/// that were removed from it.
///
/// # Errors
///
/// [`Error::MalformedCommit`] unless the header has exactly one `author` line
/// and one `committer` line, each ending in `<seconds> <timezone>`.
#[instrument(level = "debug", skip_all, fields(len = raw.len()))]
pub fn commit_to_template(raw: &[u8]) -> Result<(CommitTemplate, TimestampFields)> {
    let mut segments = Vec::new();
    let mut literal = Vec::with_capacity(raw.len());
    let mut author: Option<Timestamp> = None;
    let mut committer: Option<Timestamp> = None;
    let mut in_header = true;

    for (index, line) in raw.split(|&byte| byte == b'\n').enumerate() {
        if index > 0 {
            literal.push(b'\n');
        }

        if line.is_empty() {
            in_header = false;
        }

        let first_word = line.split(|&byte| byte == b' ').next().unwrap_or_default();
        let (slot, found) = match first_word {
            b"author" if in_header => (Segment::AuthorTimestamp, &mut author),
            b"committer" if in_header => (Segment::CommitterTimestamp, &mut committer),
            _ => {
                literal.extend_from_slice(line);
                continue;
            },
        };

        let name = String::from_utf8_lossy(first_word);
        if found.is_some() {
            return Err(Error::MalformedCommit(format!("more than one {name} line")));
        }

        let (before, seconds, timezone) = split_timestamp(line)
            .ok_or_else(|| Error::MalformedCommit(format!("no timestamp on {name} line")))?;

        trace!("Found {name} timestamp {seconds} {timezone}");

        literal.extend_from_slice(before);
        segments.push(Segment::Literal(std::mem::take(&mut literal)));
        segments.push(slot);
        literal.push(b' ');
        literal.extend_from_slice(timezone.as_bytes());

        *found = Some(Timestamp { seconds, timezone });
    }

    segments.push(Segment::Literal(literal));

    let author = author.ok_or_else(|| Error::MalformedCommit("no author line".into()))?;
    let committer = committer.ok_or_else(|| Error::MalformedCommit("no committer line".into()))?;

    let template = CommitTemplate {
        segments,
        len: raw.len(),
    };
    trace!("Commit template:\n{template}");

    Ok((template, TimestampFields { author, committer }))
}

/// Splits `line` around its second-to-last space-delimited word, which must
/// be a canonically formatted integer.
fn split_timestamp(line: &[u8]) -> Option<(&[u8], i64, String)> {
    let last_space = line.iter().rposition(|&byte| byte == b' ')?;
    let timestamp_space = line[..last_space].iter().rposition(|&byte| byte == b' ')?;

    let timestamp = std::str::from_utf8(&line[timestamp_space + 1..last_space]).ok()?;
    let seconds: i64 = timestamp.parse().ok()?;
    if seconds.to_string() != timestamp {
        return None;
    }

    let timezone = std::str::from_utf8(&line[last_space + 1..]).ok()?.to_string();

    Some((&line[..=timestamp_space], seconds, timezone))
}

impl CommitTemplate {
    /// Renders the commit object with the given timestamps.
    #[must_use]
    pub fn render(&self, author_seconds: i64, committer_seconds: i64) -> Vec<u8> {
        let mut body = Vec::with_capacity(self.len + 8);
        self.render_into(&mut body, author_seconds, committer_seconds);
        body
    }

    /// Like [`CommitTemplate::render`], but reuses `body`'s allocation.
    pub fn render_into(&self, body: &mut Vec<u8>, author_seconds: i64, committer_seconds: i64) {
        body.clear();
        for segment in &self.segments {
            match segment {
                Segment::Literal(bytes) => body.extend_from_slice(bytes),
                Segment::AuthorTimestamp => body.extend_from_slice(author_seconds.to_string().as_bytes()),
                Segment::CommitterTimestamp => {
                    body.extend_from_slice(committer_seconds.to_string().as_bytes());
                },
            }
        }
    }

    /// Renders the commit object with the timestamps in `fields`.
    #[must_use]
    pub fn render_fields(&self, fields: &TimestampFields) -> Vec<u8> {
        self.render(fields.author.seconds, fields.committer.seconds)
    }
}

/// Writes the template as a percent-style format string: literal `%`s are
/// doubled and the timestamps become `%(author_date)i` and
/// `%(committer_date)i`.
impl Display for CommitTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(bytes) => {
                    for c in String::from_utf8_lossy(bytes).chars() {
                        if c == '%' {
                            f.write_str("%%")?;
                        } else {
                            f.write_char(c)?;
                        }
                    }
                },
                Segment::AuthorTimestamp => f.write_str("%(author_date)i")?,
                Segment::CommitterTimestamp => f.write_str("%(committer_date)i")?,
            }
        }
        Ok(())
    }
}
