use std::fmt::Write;

use crate::models::{AttendanceRecord, AttendanceStatus};

const ATTENDANCE_PAGE: &str = include_str!("../templates/attendance.html");

pub fn render_attendance_page(records: &[AttendanceRecord]) -> String {
    let mut rows = String::new();
    for record in records {
        render_row(&mut rows, record);
    }
    let empty = if records.is_empty() {
        "  <p class=\"empty\">No attendance has been recorded yet.</p>"
    } else {
        ""
    };
    fill_template(ATTENDANCE_PAGE, &[("{{rows}}", rows.as_str()), ("{{empty}}", empty)])
}

/// Substitutes each placeholder once, in template order. Inserted values are
/// never rescanned, so record text can't expand a later placeholder.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut page = String::with_capacity(template.len());
    let mut rest = template;
    for (placeholder, value) in values {
        match rest.split_once(placeholder) {
            Some((before, after)) => {
                page.push_str(before);
                page.push_str(value);
                rest = after;
            }
            None => log::warn!("Template is missing placeholder {}", placeholder),
        }
    }
    page.push_str(rest);
    page
}

fn render_row(out: &mut String, record: &AttendanceRecord) {
    // writing into a String never fails
    let _ = write!(
        out,
        concat!(
            "      <tr>\n",
            "        <td>{id}</td>\n",
            "        <td>{name}</td>\n",
            "        <td>{date}</td>\n",
            "        <td>{time}</td>\n",
            "        <td>\n",
            "          <select onchange=\"updateStatus({id}, this.value)\">\n",
        ),
        id = record.id,
        name = escape_html(&record.student_name),
        date = record.timestamp.format("%Y-%m-%d"),
        time = record.timestamp.format("%H:%M:%S"),
    );
    for status in AttendanceStatus::ALL {
        let selected = if status == record.status { " selected" } else { "" };
        let _ = writeln!(
            out,
            "            <option value=\"{0}\"{1}>{0}</option>",
            status, selected
        );
    }
    out.push_str("          </select>\n        </td>\n      </tr>\n");
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
