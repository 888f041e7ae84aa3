//! Output formatting for select command results.

use super::execute::SelectResult;
use crate::output::{Outputable, render_rows};

impl Outputable for SelectResult {
    fn to_table(&self) -> String {
        render_rows(&self.rows)
    }
}
