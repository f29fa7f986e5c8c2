//! Stateless movie tile rendering plus the small text helpers shared with the
//! detail page.

use crate::models::MovieSummary;
use crate::navigation::Route;
use crate::tmdb::poster_url;

const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLayout {
    /// Characters that fit on one line of the tile.
    pub line_width: usize,
    pub title_lines: usize,
    pub synopsis_lines: usize,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            line_width: 20,
            title_lines: 2,
            synopsis_lines: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieCard {
    pub id: i32,
    pub poster_url: Option<String>,
    pub title: String,
    pub rating: String,
    pub rating_label: String,
    pub year: Option<String>,
    pub synopsis: String,
}

impl MovieCard {
    /// Where selecting the tile leads.
    pub fn select(&self) -> Route {
        Route::MovieDetail { id: self.id }
    }
}

pub fn render_card(movie: &MovieSummary, image_host: &str, layout: &CardLayout) -> MovieCard {
    let rating = format_rating(movie.vote_average);
    MovieCard {
        id: movie.id,
        poster_url: poster_url(image_host, movie.poster_path.as_deref()),
        title: truncate_lines(&movie.title, layout.title_lines, layout.line_width),
        rating_label: star_label(&rating),
        rating,
        year: movie.release_date.as_deref().and_then(release_year),
        synopsis: truncate_lines(&movie.overview, layout.synopsis_lines, layout.line_width),
    }
}

/// One decimal place, halves rounded away from zero on the decimal value,
/// so 7.05 reads "7.1" even though its binary value sits just below.
pub fn format_rating(vote_average: f64) -> String {
    if !vote_average.is_finite() {
        return "0.0".to_string();
    }
    let rounded = (vote_average * 10.0).round() / 10.0;
    format!("{rounded:.1}")
}

pub fn star_label(rating: &str) -> String {
    format!("⭐ {rating}")
}

/// Leading four-digit segment of an ISO date string.
pub fn release_year(date: &str) -> Option<String> {
    let head = date.trim().split('-').next()?;
    if head.len() == 4 && head.chars().all(|c| c.is_ascii_digit()) {
        Some(head.to_string())
    } else {
        None
    }
}

/// Word-wraps `text` at `width` characters and keeps at most `max_lines`
/// lines, ending with an ellipsis when anything was cut. Lines are joined
/// with `\n`.
pub fn truncate_lines(text: &str, max_lines: usize, width: usize) -> String {
    if max_lines == 0 || width == 0 {
        return String::new();
    }
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut truncated = false;

    'words: for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let used = current.chars().count();
            let sep = usize::from(used > 0);
            if used + sep + word.len() <= width {
                if sep == 1 {
                    current.push(' ');
                }
                current.extend(word.iter());
                continue 'words;
            }
            if used > 0 {
                lines.push(std::mem::take(&mut current));
            } else {
                // A single word longer than the line is hard-split.
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if lines.len() == max_lines {
                truncated = true;
                break 'words;
            }
        }
    }
    if !truncated && !current.is_empty() {
        lines.push(current);
    }

    if truncated {
        if let Some(last) = lines.last_mut() {
            let mut chars: Vec<char> = last.chars().collect();
            if chars.len() >= width {
                chars.truncate(width - 1);
            }
            while chars.last().is_some_and(|c| c.is_whitespace()) {
                chars.pop();
            }
            chars.push(ELLIPSIS);
            *last = chars.into_iter().collect();
        }
    }
    lines.join("\n")
}

/// Groups digits by thousands: 12345 -> "12,345".
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
