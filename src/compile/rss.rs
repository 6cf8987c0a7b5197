use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use log::*;
use quick_xml::{
    Writer,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use url::Url;

use crate::{
    ChangelogError, Result,
    compile::{CompileOutcome, DATA_FILE, RSS_FILE, json::ChangelogData},
    config::FeedConfig,
};

const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

type XmlWriter = Writer<Vec<u8>>;

fn rfc822(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn start(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    start(writer, name)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, name)
}

/// CDATA element. A literal `]]>` is split across two sections.
fn cdata_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    start(writer, name)?;

    let mut pieces = text.split("]]>").peekable();
    while let Some(piece) = pieces.next() {
        if pieces.peek().is_some() {
            writer.write_event(Event::CData(BytesCData::new(format!("{piece}]]"))))?;
            writer.write_event(Event::CData(BytesCData::new(">")))?;
        } else {
            writer.write_event(Event::CData(BytesCData::new(piece)))?;
        }
    }

    end(writer, name)
}

/// Render the RSS 2.0 document for `data`.
pub fn render_feed(data: &ChangelogData, feed: &FeedConfig) -> Result<String> {
    Url::parse(&feed.site_url)?;

    let site = feed.site_url.trim_end_matches('/');
    let changelog_url = format!("{site}/changelog");

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("rss").with_attributes([
        ("version", "2.0"),
        ("xmlns:content", CONTENT_NS),
        ("xmlns:dc", DC_NS),
        ("xmlns:atom", ATOM_NS),
    ])))?;
    start(&mut writer, "channel")?;

    text_element(&mut writer, "title", &feed.title)?;
    text_element(&mut writer, "link", site)?;
    text_element(&mut writer, "description", &feed.description)?;
    text_element(&mut writer, "language", &feed.language)?;
    text_element(&mut writer, "lastBuildDate", &rfc822(data.generated_at))?;
    text_element(&mut writer, "generator", env!("CARGO_PKG_NAME"))?;
    text_element(
        &mut writer,
        "copyright",
        &format!("Copyright © {} {}", data.generated_at.year(), feed.author_name),
    )?;
    writer.write_event(Event::Empty(BytesStart::new("atom:link").with_attributes([
        ("href", format!("{site}/changelog.xml").as_str()),
        ("rel", "self"),
        ("type", "application/rss+xml"),
    ])))?;
    start(&mut writer, "atom:author")?;
    text_element(&mut writer, "atom:name", &feed.author_name)?;
    text_element(&mut writer, "atom:uri", &feed.author_link)?;
    end(&mut writer, "atom:author")?;

    for entry in data.entries.iter() {
        start(&mut writer, "item")?;

        text_element(&mut writer, "title", &entry.title)?;
        text_element(&mut writer, "link", &format!("{changelog_url}#{}", entry.slug))?;
        writer.write_event(Event::Start(
            BytesStart::new("guid").with_attributes([("isPermaLink", "false")]),
        ))?;
        writer.write_event(Event::Text(BytesText::new(&entry.id)))?;
        end(&mut writer, "guid")?;
        text_element(&mut writer, "pubDate", &rfc822(midnight(entry.date)))?;
        cdata_element(&mut writer, "description", &entry.summary)?;
        cdata_element(&mut writer, "content:encoded", &entry.full_content)?;
        text_element(&mut writer, "dc:creator", &feed.author_name)?;

        for category in entry.categories.iter() {
            text_element(&mut writer, "category", category)?;
        }

        end(&mut writer, "item")?;
    }

    end(&mut writer, "channel")?;
    end(&mut writer, "rss")?;

    Ok(String::from_utf8(writer.into_inner())?)
}

fn needs_regeneration(data_file: &Path, output: &Path) -> Result<bool> {
    if !output.exists() {
        return Ok(true);
    }

    let data_modified = fs::metadata(data_file)?.modified()?;
    let output_modified = fs::metadata(output)?.modified()?;

    Ok(data_modified > output_modified)
}

/// Replace `path` with `content` through a temporary file in the same
/// directory.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Paths used by [`compile_rss`].
#[derive(Debug, Clone)]
pub struct RssPaths {
    pub data_file: PathBuf,
    pub output: PathBuf,
}

impl RssPaths {
    pub fn for_repo(repo_root: &Path) -> Self {
        Self {
            data_file: repo_root.join(DATA_FILE),
            output: repo_root.join(RSS_FILE),
        }
    }
}

fn regenerate(paths: &RssPaths, feed: &FeedConfig) -> Result<usize> {
    let content = fs::read_to_string(&paths.data_file)?;
    let data: ChangelogData = serde_json::from_str(&content)?;

    let xml = render_feed(&data, feed)?;
    write_atomic(&paths.output, &xml)?;

    Ok(data.entries.len())
}

/// Regenerate the RSS feed when the data file is newer than the feed.
/// A missing data file is the only error, any other failure leaves the
/// existing feed in place.
pub fn compile_rss(paths: &RssPaths, feed: &FeedConfig) -> Result<CompileOutcome> {
    if !paths.data_file.exists() {
        return Err(ChangelogError::MissingInputFile(
            paths.data_file.display().to_string(),
        ));
    }

    match needs_regeneration(&paths.data_file, &paths.output) {
        Ok(true) => {}
        Ok(false) => {
            info!("no changes detected in changelog data, skipping RSS generation");
            return Ok(CompileOutcome::Unchanged);
        }
        Err(err) => {
            warn!("unable to compare RSS feed timestamps, skipping: {err}");
            return Ok(CompileOutcome::Unchanged);
        }
    }

    match regenerate(paths, feed) {
        Ok(entries) => {
            info!(
                "generated RSS feed with {entries} entries at {}",
                paths.output.display()
            );
            Ok(CompileOutcome::Generated {
                path: paths.output.clone(),
                entries,
            })
        }
        Err(err) => {
            warn!("failed to generate RSS feed, skipping: {err}");
            Ok(CompileOutcome::Unchanged)
        }
    }
}
