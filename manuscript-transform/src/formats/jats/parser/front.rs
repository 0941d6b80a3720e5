//! Front-matter extraction
//!
//! The last normalization stage. It reads `front` once, leaves fragment elements in its place
//! (title, contributors, affiliations, author notes, supplements), stores manuscript-level
//! metadata as attributes of the article element, records the journal metadata in the import
//! context, then discards `front` itself.

use super::pipeline::{ImportContext, XmlTransform};
use super::stages::ensure_body;
use crate::error::FormatError;
use crate::formats::jats::{Journal, TypedValue};
use crate::ir::nodes::{XmlElement, XmlNode};
use chrono::{NaiveDate, TimeZone, Utc};

pub const TITLE_FRAGMENT: &str = "manuscript-title";
pub const CONTRIBUTORS_FRAGMENT: &str = "contributors";
pub const AFFILIATIONS_FRAGMENT: &str = "affiliations";
pub const AUTHOR_NOTES_FRAGMENT: &str = "author-notes";
pub const SUPPLEMENTS_FRAGMENT: &str = "supplements";

/// `counts` children and the manuscript attribute each one fills.
pub const COUNTS: &[(&str, &str)] = &[
    ("fig-count", "figureCount"),
    ("table-count", "tableCount"),
    ("equation-count", "equationCount"),
    ("ref-count", "referenceCount"),
    ("word-count", "wordCount"),
];

/// History `date-type` values and the manuscript attribute each one fills.
pub const HISTORY_DATES: &[(&str, &str)] = &[
    ("received", "receiveDate"),
    ("rev-request", "revisionRequestDate"),
    ("rev-recd", "revisionReceiveDate"),
    ("accepted", "acceptanceDate"),
    ("corrected", "correctionDate"),
];

pub struct ExtractFront;

impl XmlTransform for ExtractFront {
    fn name(&self) -> &str {
        "extract-front"
    }

    fn transform(
        &self,
        mut article: XmlElement,
        ctx: &mut ImportContext,
    ) -> Result<XmlElement, FormatError> {
        let Some(position) = article
            .children
            .iter()
            .position(|node| node.is_element_named("front"))
        else {
            return Ok(article);
        };
        let front = match article.children.remove(position) {
            XmlNode::Element(front) => front,
            other => {
                article.children.insert(position, other);
                return Ok(article);
            }
        };

        if let Some(journal_meta) = front.child("journal-meta") {
            ctx.journal = Some(journal(journal_meta));
        }
        let empty = XmlElement::new("article-meta");
        let meta = front.child("article-meta").unwrap_or(&empty);

        for (name, value) in manuscript_attrs(meta) {
            article.set_attr(&name, value);
        }

        let mut fragments = vec![title_fragment(meta, &ctx.options.default_title)];
        fragments.extend(contributors_fragment(meta));
        fragments.extend(affiliations_fragment(meta));
        if let Some(notes) = meta.child("author-notes") {
            fragments.push(notes.clone());
        }
        fragments.extend(supplements_fragment(meta));
        article.children.splice(
            position..position,
            fragments.into_iter().map(XmlNode::Element),
        );

        let keyword_groups: Vec<XmlNode> = meta
            .elements_named("kwd-group")
            .cloned()
            .map(XmlNode::Element)
            .collect();
        if !keyword_groups.is_empty() {
            insert_keywords(&mut article, keyword_groups);
        }
        Ok(article)
    }
}

fn title_fragment(meta: &XmlElement, default_title: &str) -> XmlElement {
    let fragment = XmlElement::new(TITLE_FRAGMENT);
    match meta.find(&["title-group", "article-title"]) {
        Some(title) if title.has_meaningful_content() => {
            fragment.with_children(title.children.iter().cloned())
        }
        _ => fragment.with_text(default_title),
    }
}

fn contributors_fragment(meta: &XmlElement) -> Option<XmlElement> {
    let contribs: Vec<XmlElement> = meta
        .elements_named("contrib-group")
        .flat_map(|group| group.elements_named("contrib"))
        .enumerate()
        .map(|(priority, contrib)| {
            contrib
                .clone()
                .with_attr("priority", priority.to_string())
        })
        .collect();
    if contribs.is_empty() {
        return None;
    }
    Some(
        XmlElement::new(CONTRIBUTORS_FRAGMENT)
            .with_children(contribs.into_iter().map(XmlNode::Element)),
    )
}

fn affiliations_fragment(meta: &XmlElement) -> Option<XmlElement> {
    let mut seen = Vec::new();
    let mut affs = Vec::new();
    let candidates = meta.elements_named("aff").chain(
        meta.elements_named("contrib-group")
            .flat_map(|group| group.elements_named("aff")),
    );
    for aff in candidates {
        if let Some(id) = aff.attr("id") {
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);
        }
        let priority = affs.len().to_string();
        affs.push(XmlNode::Element(aff.clone().with_attr("priority", priority)));
    }
    if affs.is_empty() {
        return None;
    }
    Some(XmlElement::new(AFFILIATIONS_FRAGMENT).with_children(affs))
}

fn supplements_fragment(meta: &XmlElement) -> Option<XmlElement> {
    let supplements: Vec<XmlNode> = meta
        .elements_named("supplementary-material")
        .cloned()
        .map(XmlNode::Element)
        .collect();
    if supplements.is_empty() {
        return None;
    }
    Some(XmlElement::new(SUPPLEMENTS_FRAGMENT).with_children(supplements))
}

/// Keyword groups go into a body section placed after the leading abstracts.
fn insert_keywords(article: &mut XmlElement, groups: Vec<XmlNode>) {
    let sec = XmlElement::new("sec")
        .with_attr("sec-type", "keywords")
        .with_child(XmlElement::new("title").with_text("Keywords"))
        .with_children(groups);
    let index = ensure_body(article);
    if let XmlNode::Element(body) = &mut article.children[index] {
        let at = body
            .children
            .iter()
            .position(|node| {
                !node.is_blank()
                    && !node.as_element().is_some_and(|sec| {
                    sec.attr("sec-type")
                        .is_some_and(|t| t == "abstract" || t.starts_with("abstract-"))
                })
            })
            .unwrap_or(body.children.len());
        body.children.insert(at, XmlNode::Element(sec));
    }
}

fn manuscript_attrs(meta: &XmlElement) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    if let Some(doi) = meta
        .elements_named("article-id")
        .find(|id| id.attr("pub-id-type") == Some("doi"))
    {
        attrs.push(("doi".to_string(), doi.text_content().trim().to_string()));
    }
    if let Some(counts) = meta.child("counts") {
        for (element, attr) in COUNTS {
            if let Some(count) = counts
                .child(element)
                .and_then(|el| el.non_empty_attr("count"))
                .filter(|count| count.parse::<u64>().is_ok())
            {
                attrs.push((attr.to_string(), count.to_string()));
            }
        }
    }
    if let Some(history) = meta.child("history") {
        for date in history.elements_named("date") {
            let Some((_, attr)) = HISTORY_DATES
                .iter()
                .find(|(date_type, _)| date.attr("date-type") == Some(*date_type))
            else {
                continue;
            };
            match date_timestamp(date) {
                Some(timestamp) => attrs.push((attr.to_string(), timestamp.to_string())),
                None => tracing::warn!(
                    date_type = date.attr("date-type").unwrap_or_default(),
                    "Ignoring history date without a valid year, month and day"
                ),
            }
        }
    }
    attrs
}

fn date_part(date: &XmlElement, name: &str) -> Option<u32> {
    date.child(name)?.text_content().trim().parse().ok()
}

/// Seconds since the epoch of midnight UTC on the element's date.
pub fn date_timestamp(date: &XmlElement) -> Option<i64> {
    let year = date_part(date, "year")?;
    let month = date_part(date, "month").unwrap_or(1);
    let day = date_part(date, "day").unwrap_or(1);
    let naive = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?
        .and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive).timestamp())
}

fn typed(el: &XmlElement, type_attr: &str) -> TypedValue {
    TypedValue {
        kind: el.non_empty_attr(type_attr).map(str::to_string),
        value: el.text_content().trim().to_string(),
    }
}

/// Reads `journal-meta`.
pub fn journal(meta: &XmlElement) -> Journal {
    let title_group = meta.child("journal-title-group");
    Journal {
        identifiers: meta
            .elements_named("journal-id")
            .map(|id| typed(id, "journal-id-type"))
            .collect(),
        title: title_group
            .and_then(|group| group.child("journal-title"))
            .map(|title| title.text_content().trim().to_string()),
        abbreviated_titles: title_group
            .map(|group| {
                group
                    .elements_named("abbrev-journal-title")
                    .map(|title| typed(title, "abbrev-type"))
                    .collect()
            })
            .unwrap_or_default(),
        issns: meta
            .elements_named("issn")
            .map(|issn| {
                let format = issn
                    .non_empty_attr("publication-format")
                    .or_else(|| issn.non_empty_attr("pub-type"));
                TypedValue {
                    kind: format.map(str::to_string),
                    value: issn.text_content().trim().to_string(),
                }
            })
            .collect(),
        publisher_name: meta
            .find(&["publisher", "publisher-name"])
            .map(|name| name.text_content().trim().to_string()),
    }
}
