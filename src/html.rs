use std::fmt::Write;

use crate::render::{ContextCard, Fragment, LinkEntry, Overview, RowVariant, TaxonRow};

const STYLE: &str = "body{font-family:-apple-system,'Segoe UI',sans-serif;margin:2rem;color:#1f2933}\
.card{border:1px solid #d9e2ec;border-radius:8px;padding:1rem 1.25rem;margin-bottom:1rem}\
.badge{display:inline-block;background:#e6f6ff;border-radius:999px;padding:2px 10px;margin-right:6px}\
.tiles,.context{display:grid;grid-template-columns:repeat(3,1fr);gap:.75rem}\
.context{grid-template-columns:repeat(2,1fr)}\
.row{border-left:4px solid #829ab1;padding:.5rem .75rem;margin:.5rem 0}\
.row.primary{border-color:#0967d2}.row.secondary{border-color:#27ab83}.row.tertiary{border-color:#f0b429}\
.chip{display:inline-block;background:#f0f4f8;border-radius:4px;padding:1px 8px;margin:2px}";

/// Renders the card tree as a standalone HTML page. An empty tree yields an
/// empty `<main>`.
pub fn render_page(fragments: &[Fragment]) -> String {
    let title = fragments
        .iter()
        .find_map(|fragment| match fragment {
            Fragment::Overview(overview) => Some(overview.title.as_str()),
            _ => None,
        })
        .unwrap_or("Study metadata");

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape_html(title));
    let _ = writeln!(out, "<style>{STYLE}</style>");
    out.push_str("</head>\n<body>\n<main>\n");
    for fragment in fragments {
        match fragment {
            Fragment::Overview(overview) => push_overview(&mut out, overview),
            Fragment::Links { entries } => push_links(&mut out, entries),
            Fragment::Taxa { rows } => push_taxa(&mut out, rows),
            Fragment::EcologicalContext(card) => push_context(&mut out, card),
        }
    }
    out.push_str("</main>\n</body>\n</html>\n");
    out
}

fn push_overview(out: &mut String, overview: &Overview) {
    out.push_str("<section class=\"card overview\">\n");
    let _ = writeln!(out, "<h1>{}</h1>", escape_html(&overview.title));
    let _ = writeln!(out, "<p>{}</p>", escape_html(&overview.abstract_text));
    out.push_str("<div class=\"badges\">");
    for badge in &overview.badges {
        let _ = write!(out, "<span class=\"badge\">{}</span>", escape_html(&badge.text));
    }
    out.push_str("</div>\n<div class=\"tiles\">\n");
    for tile in &overview.tiles {
        let _ = writeln!(
            out,
            "<div class=\"tile\"><strong>{}</strong><br><small>{}</small></div>",
            escape_html(&tile.primary),
            escape_html(&tile.secondary)
        );
    }
    out.push_str("</div>\n</section>\n");
}

fn push_links(out: &mut String, entries: &[LinkEntry]) {
    out.push_str("<section class=\"card links\">\n<h2>NCBI Database Links</h2>\n<ul>\n");
    for entry in entries {
        let target = if entry.new_context {
            " target=\"_blank\""
        } else {
            ""
        };
        let rel = if entry.no_opener {
            " rel=\"noopener noreferrer\""
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "<li><a href=\"{}\"{target}{rel}>{}</a> <code>{}</code></li>",
            escape_html(&entry.href),
            escape_html(&entry.label),
            escape_html(&entry.identifier)
        );
    }
    out.push_str("</ul>\n</section>\n");
}

fn push_taxa(out: &mut String, rows: &[TaxonRow]) {
    out.push_str("<section class=\"card taxa\">\n<h2>Identified Taxa</h2>\n");
    for row in rows {
        let variant = match row.variant {
            RowVariant::Primary => "primary",
            RowVariant::Secondary => "secondary",
            RowVariant::Tertiary => "tertiary",
        };
        let _ = writeln!(
            out,
            "<div class=\"row {variant}\" data-expanded=\"{}\">",
            row.expanded
        );
        let _ = writeln!(
            out,
            "<h3>{}</h3><p>{}</p><p><strong>{}</strong> ASVs &middot; {}</p>",
            escape_html(&row.name),
            escape_html(&row.description),
            escape_html(&row.asv_count),
            escape_html(&row.share)
        );
        if let Some(detail) = &row.detail {
            out.push_str("<div class=\"detail\">\n");
            let _ = writeln!(out, "<p>{}</p>", escape_html(&detail.ecological_role));
            for member in &detail.members {
                let _ = write!(out, "<span class=\"chip\">{}</span>", escape_html(member));
            }
            out.push_str("\n</div>\n");
        }
        out.push_str("</div>\n");
    }
    out.push_str("</section>\n");
}

fn push_context(out: &mut String, card: &ContextCard) {
    out.push_str("<section class=\"card ecological-context\">\n<h2>Ecological Context</h2>\n");
    out.push_str("<div class=\"context\">\n");
    for (label, value) in [
        ("Habitat", &card.habitat),
        ("Depth Range", &card.depth_range),
        ("Environmental Factors", &card.environmental_factors),
        ("Study Focus", &card.study_focus),
    ] {
        let _ = writeln!(
            out,
            "<div><h4>{label}</h4><p>{}</p></div>",
            escape_html(value)
        );
    }
    out.push_str("</div>\n</section>\n");
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
