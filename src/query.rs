use sea_orm::{
    ColumnTrait, Condition,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};
use serde::Deserialize;

use crate::entities::movie;

/// Query string of `GET /read`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    pub id: Option<String>,
    #[serde(rename = "ratingFr", alias = "ratingFrom")]
    pub rating_from: Option<String>,
    #[serde(rename = "ratingTo")]
    pub rating_to: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TextMatch {
    /// Title or id contains the respective needle.
    Either { title: String, id: String },
    Title(String),
    Id(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RatingFilter {
    /// Inclusive on both ends.
    Between { from: f64, to: f64 },
    Exactly(f64),
}

impl RatingFilter {
    pub fn from_bounds(from: Option<f64>, to: Option<f64>) -> Option<Self> {
        let to = to.filter(|to| *to >= 0.0)?;
        let from = from?;
        if to > from {
            Some(RatingFilter::Between { from, to })
        } else if to == from && to != 0.0 {
            Some(RatingFilter::Exactly(to))
        } else {
            None
        }
    }

    fn condition(self) -> SimpleExpr {
        let rating = movie::Column::Rating;
        match self {
            RatingFilter::Between { from, to } => match (from.is_finite(), to.is_finite()) {
                (true, true) => rating.between(from, to),
                (true, false) => rating.gte(from),
                (false, true) => rating.lte(to),
                (false, false) => Expr::value(true),
            },
            RatingFilter::Exactly(value) if value.is_finite() => rating.eq(value),
            // stored ratings are finite
            RatingFilter::Exactly(_) => Expr::value(false),
        }
    }
}

/// Structured form of a movie search. Every present branch must hold.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieQuery {
    pub text: Option<TextMatch>,
    pub rating: Option<RatingFilter>,
}

impl MovieQuery {
    pub fn from_params(params: &SearchParams) -> Self {
        let title = non_empty(params.title.as_deref());
        let id = non_empty(params.id.as_deref());

        let text = match (title, id) {
            (Some(title), Some(id)) => Some(TextMatch::Either { title, id }),
            (Some(title), None) => Some(TextMatch::Title(title)),
            (None, Some(id)) => Some(TextMatch::Id(id)),
            (None, None) => None,
        };

        let rating = RatingFilter::from_bounds(
            parse_rating(params.rating_from.as_deref()),
            parse_rating(params.rating_to.as_deref()),
        );

        Self { text, rating }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.text.is_none() && self.rating.is_none()
    }

    pub fn condition(&self) -> Condition {
        let text = self.text.as_ref().map(|text| match text {
            TextMatch::Either { title, id } => {
                Condition::any().add(title_contains(title)).add(id_contains_expr(id))
            },
            TextMatch::Title(title) => Condition::all().add(title_contains(title)),
            TextMatch::Id(id) => Condition::all().add(id_contains_expr(id)),
        });

        Condition::all()
            .add_option(text)
            .add_option(self.rating.map(RatingFilter::condition))
    }
}

/// Ids containing `needle`, ignoring case. An empty needle matches everything.
pub fn id_contains(needle: &str) -> Condition {
    Condition::all().add(id_contains_expr(needle))
}

/// Matches against the stored folded title, so both sides fold with the same
/// Unicode rules.
fn title_contains(needle: &str) -> SimpleExpr {
    Expr::col(movie::Column::TitleFolded).like(contains_pattern(&movie::fold_title(needle)))
}

/// Ids are folded by SQLite's `lower()`, which only knows ASCII; the needle
/// is folded the same way.
fn id_contains_expr(needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(movie::Column::Id)))
        .like(contains_pattern(&needle.to_ascii_lowercase()))
}

/// `'%needle%'` with the needle taken literally.
fn contains_pattern(needle: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(needle))).escape('\\')
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Reads the leading number of `value` like a browser's `parseFloat`:
/// `"8abc"` is 8, `"Infinity"` is infinite, anything without a leading number
/// is absent.
fn parse_rating(value: Option<&str>) -> Option<f64> {
    let text = value?.trim_start();
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned.starts_with("Infinity") {
        let inf = if text.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
        return Some(inf);
    }

    let bytes = unsigned.as_bytes();
    let digits_from = |start: usize| bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int_len = digits_from(0);
    let mut end = int_len;
    if bytes.get(end) == Some(&b'.') {
        let frac_len = digits_from(end + 1);
        if int_len + frac_len > 0 {
            end += 1 + frac_len;
        }
    }
    if end == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_len = digits_from(end + 1 + sign);
        if exp_len > 0 {
            end += 1 + sign + exp_len;
        }
    }

    let sign_len = text.len() - unsigned.len();
    text[..sign_len + end].parse().ok()
}
