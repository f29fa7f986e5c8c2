//! Plain-text drawing of screen views for the terminal browser.

use crate::navigation::BACK_LABEL;
use crate::screens::detail::LOADING_TEXT;
use crate::screens::{DetailView, ListView};

const LIST_HINT: &str = "Enter a number to open a movie, q to quit.";
const DETAIL_HINT: &str = "b to go back, q to quit.";
const PAD: &str = "     ";

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn draw_list(view: &ListView) -> String {
    let mut lines = Vec::new();
    match view {
        ListView::Loading => lines.push(LOADING_TEXT.to_string()),
        ListView::Grid { header, tiles } => {
            lines.push(format!("== {header} =="));
            for (i, tile) in tiles.iter().enumerate() {
                let mut title = tile.title.lines();
                let first = title.next().unwrap_or_default();
                lines.push(format!("[{:>2}] {first}", i + 1));
                lines.extend(title.map(|rest| format!("{PAD}{rest}")));
                lines.push(match &tile.year {
                    Some(year) => format!("{PAD}{} · {year}", tile.rating_label),
                    None => format!("{PAD}{}", tile.rating_label),
                });
                lines.extend(tile.synopsis.lines().map(|l| format!("{PAD}{l}")));
                let poster = tile.poster_url.as_deref().unwrap_or("(no poster)");
                lines.push(format!("{PAD}{poster}"));
            }
            lines.push(String::new());
            lines.push(LIST_HINT.to_string());
        }
        ListView::Error { message } => {
            lines.push(message.clone());
            lines.push(LIST_HINT.to_string());
        }
    }
    finish(lines)
}

pub fn draw_detail(view: &DetailView, title: &str) -> String {
    let mut lines = vec![format!("< {BACK_LABEL} | {title}")];
    match view {
        DetailView::Loading => lines.push(LOADING_TEXT.to_string()),
        DetailView::Page(page) => {
            lines.push(page.poster_url.as_deref().unwrap_or("(no poster)").to_string());
            lines.push(page.title.clone());
            lines.push(page.rating_label.clone());
            for optional in [&page.info_line, &page.genres] {
                if !optional.is_empty() {
                    lines.push(optional.clone());
                }
            }
            lines.extend(page.tagline.clone());
            lines.push(String::new());
            lines.push(page.overview.clone());
            lines.push(String::new());
            lines.push(format!("Languages: {}", page.languages));
            lines.push(format!("Studios: {}", page.studios));
            lines.push(format!("Total Votes: {}", page.total_votes));
        }
        DetailView::Error { message } => lines.push(message.clone()),
    }
    lines.push(String::new());
    lines.push(DETAIL_HINT.to_string());
    finish(lines)
}
