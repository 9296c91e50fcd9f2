// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2020 Tobias Hunger <tobias.hunger@gmail.com>

//! Meta information about git commits and tags

// ----------------------------------------------------------------------
// - Constants:
// ----------------------------------------------------------------------

/// `git log` format matching `parse_commit`
pub(crate) const COMMIT_FORMAT: &str = "%H%x00%an%x00%ae%x00%ad%x00%cn%x00%ce%x00%cd%x00%s%x00%b";

/// `git for-each-ref` format matching `parse_tag`
pub(crate) const TAG_FORMAT: &str = "%(objecttype)%00%(objectname)%00%(refname:strip=2)%00\
%(taggername)%00%(taggeremail)%00%(taggerdate:raw)%00%(contents:subject)%00%(contents:body)";

// ----------------------------------------------------------------------
// - Types:
// ----------------------------------------------------------------------

/// Author, committer or tagger of a git object
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Person {
    /// The name
    pub name: String,
    /// The e-mail address
    pub email: String,
    /// Unix timestamp and timezone offset, e.g. `1386000000 +0200`
    pub date: String,
}

/// Meta information on a commit
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CommitMeta {
    /// The commit SHA-1
    pub id: String,
    /// The author
    pub author: Person,
    /// The committer
    pub committer: Person,
    /// First line of the commit message
    pub subject: String,
    /// Rest of the commit message
    pub body: String,
}

/// Meta information on an annotated tag
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TagMeta {
    /// The tag name
    pub name: String,
    /// The SHA-1 of the tag object
    pub id: String,
    /// The tagger
    pub tagger: Person,
    /// First line of the tag message
    pub subject: String,
    /// Rest of the tag message
    pub body: String,
}

/// Meta information on a tree-ish as requested by the user
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TreeishMeta {
    /// The tree-ish as given by the user
    pub treeish: String,
    /// The commit the tree-ish resolved to
    pub commit: CommitMeta,
    /// The annotated tag, if the tree-ish names one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagMeta>,
}

// ----------------------------------------------------------------------
// - Parsing:
// ----------------------------------------------------------------------

fn strip_email(email: &str) -> String {
    email
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_string()
}

fn person<'a>(fields: &mut impl Iterator<Item = &'a str>) -> Option<Person> {
    Some(Person {
        name: fields.next()?.to_string(),
        email: strip_email(fields.next()?),
        date: fields.next()?.to_string(),
    })
}

/// Parse the output of `git log -1 --date=raw --format=COMMIT_FORMAT`
pub(crate) fn parse_commit(raw: &str) -> Option<CommitMeta> {
    let raw = raw.strip_suffix('\n').unwrap_or(raw);
    let mut fields = raw.splitn(9, '\0');

    let id = fields.next()?.trim().to_string();
    if id.is_empty() {
        return None;
    }
    let author = person(&mut fields)?;
    let committer = person(&mut fields)?;
    let subject = fields.next()?.to_string();
    let body = fields.next().unwrap_or_default().trim_end().to_string();

    Some(CommitMeta {
        id,
        author,
        committer,
        subject,
        body,
    })
}

/// Parse the output of `git for-each-ref --format=TAG_FORMAT`
///
/// Returns `None` for lightweight tags and empty output.
pub(crate) fn parse_tag(raw: &str) -> Option<TagMeta> {
    let raw = raw.strip_suffix('\n').unwrap_or(raw);
    let mut fields = raw.splitn(8, '\0');

    if fields.next()? != "tag" {
        return None;
    }
    let id = fields.next()?.to_string();
    let name = fields.next()?.to_string();
    let tagger = person(&mut fields)?;
    let subject = fields.next()?.to_string();
    let body = fields.next().unwrap_or_default().trim_end().to_string();

    Some(TagMeta {
        name,
        id,
        tagger,
        subject,
        body,
    })
}

// ----------------------------------------------------------------------
// - Tests:
// ----------------------------------------------------------------------
