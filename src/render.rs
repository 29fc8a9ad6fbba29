//! Plain-text frames of the grid.
use std::fmt::Write;

use crate::agent::CellView;
use crate::snapshot::PopulationSnapshot;
use crate::status::InfectionStatus;

fn cell_glyph(cell: &CellView) -> &'static str {
    match (cell.status, cell.quarantined) {
        (InfectionStatus::Susceptible, false) => "   ",
        (InfectionStatus::Infectious, false) => " I ",
        (InfectionStatus::Recovered, false) => " R ",
        (InfectionStatus::Susceptible, true) => "[ ]",
        (InfectionStatus::Infectious, true) => "[I]",
        (InfectionStatus::Recovered, true) => "[R]",
    }
}

/// Renders a snapshot as a title line with the status percentages followed by one line
/// per grid row. Every cell takes four characters: three for its status, bracketed while
/// quarantined, and one for its behavior flag.
pub fn render_text(snapshot: &PopulationSnapshot) -> String {
    let size = snapshot.size();
    let mut out = String::with_capacity((size * 4 + 1) * (size + 1));
    let _ = writeln!(out, "{}", snapshot.demographics());
    for row in snapshot.rows() {
        for cell in row {
            out.push_str(cell_glyph(cell));
            out.push(cell.behavior.flag());
        }
        out.push('\n');
    }
    out
}
