use chrono::{Local, NaiveDate};
use regex::Regex;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{LazyLock, Mutex, PoisonError},
};

static REMOVE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[*+~.()'"!:@]"#).unwrap());

static STRICT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\s]").unwrap());

/// Paths handed out by [`generate_filename`] in this process.
static RESERVED: LazyLock<Mutex<HashSet<PathBuf>>> =
    LazyLock::new(|| Mutex::new(HashSet::new()));

const FALLBACK_SLUG: &str = "entry";

/// Today's date in the local timezone.
pub fn current_date() -> NaiveDate {
    Local::now().date_naive()
}

/// Lowercase, URL safe slug for an entry title.
pub fn create_slug(title: &str) -> String {
    let removed = REMOVE_REGEX.replace_all(title, "");
    let strict = STRICT_REGEX.replace_all(&removed, "");

    let slug = strict
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join("-")
        .to_lowercase();

    if slug.is_empty() {
        return FALLBACK_SLUG.into();
    }

    slug
}

/// Hands out entry file names that collide neither with files already in
/// the entries directory nor with names issued earlier by the same
/// allocator.
#[derive(Debug, Clone)]
pub struct FilenameAllocator {
    entries_dir: PathBuf,
    issued: HashSet<String>,
}

impl FilenameAllocator {
    pub fn new(entries_dir: &Path) -> Self {
        Self {
            entries_dir: entries_dir.to_path_buf(),
            issued: HashSet::new(),
        }
    }

    fn is_taken(&self, file_name: &str) -> bool {
        self.issued.contains(file_name)
            || self.entries_dir.join(file_name).exists()
    }

    /// Allocate `<date>-<slug>.md`, appending `-1`, `-2`, ... until free.
    pub fn allocate(&mut self, date: NaiveDate, title: &str) -> String {
        let file_name = first_free(date, title, |name| self.is_taken(name));
        self.issued.insert(file_name.clone());
        file_name
    }
}

fn first_free(
    date: NaiveDate,
    title: &str,
    is_taken: impl Fn(&str) -> bool,
) -> String {
    let prefix = format!("{}-{}", date.format("%Y-%m-%d"), create_slug(title));
    let mut file_name = format!("{prefix}.md");
    let mut counter = 1;

    while is_taken(&file_name) {
        file_name = format!("{prefix}-{counter}.md");
        counter += 1;
    }

    file_name
}

/// File name for a new entry written today. Names are reserved for the
/// life of the process, so repeated calls never return the same name even
/// when nothing has been written yet.
pub fn generate_filename(title: &str, entries_dir: &Path) -> String {
    let mut reserved = RESERVED.lock().unwrap_or_else(PoisonError::into_inner);

    let file_name = first_free(current_date(), title, |name| {
        let path = entries_dir.join(name);
        reserved.contains(&path) || path.exists()
    });

    reserved.insert(entries_dir.join(&file_name));
    file_name
}
