use crate::app::session::Notice;
use crate::core::rows::format_number;
use crate::domain::model::{Branch, Deal, DATE_FORMAT};
use crate::utils::error::Result;
use std::io::Write;

const OPEN_DEAL_HEADERS: [&str; 9] = [
    "Customer", "Account", "Amt", "Scheme", "ROI", "Maturity", "Put", "Branch", "View",
];

fn open_deal_cells(deal: &Deal) -> [String; 9] {
    [
        deal.customer_name.clone(),
        deal.account_number.clone(),
        format_number(deal.amount),
        deal.scheme_code.clone(),
        format_number(deal.roi),
        deal.maturity_date.format(DATE_FORMAT).to_string(),
        deal.put_date.format(DATE_FORMAT).to_string(),
        deal.branch.clone(),
        if deal.certificate_url.is_empty() {
            "-".to_string()
        } else {
            deal.certificate_url.clone()
        },
    ]
}

/// Fixed-width text table of open deals, one line per deal.
pub fn render_open_deals(deals: &[Deal]) -> String {
    if deals.is_empty() {
        return "No open deals available\n".to_string();
    }

    let rows: Vec<[String; 9]> = deals.iter().map(open_deal_cells).collect();
    let mut widths: Vec<usize> = OPEN_DEAL_HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(OPEN_DEAL_HEADERS.to_vec()));
    out.push('\n');
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)));
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}

/// CSV export of open deals, including the status column.
pub fn write_open_deals_csv<W: Write>(writer: W, deals: &[Deal]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut headers: Vec<&str> = OPEN_DEAL_HEADERS[..8].to_vec();
    headers.extend(["Certificate", "Status"]);
    csv_writer.write_record(&headers)?;

    for deal in deals {
        let cells = open_deal_cells(deal);
        let mut record: Vec<String> = cells[..8].to_vec();
        record.push(deal.certificate_url.clone());
        record.push(deal.status.to_string());
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn render_branches(branches: &[Branch]) -> String {
    branches
        .iter()
        .map(|b| format!("{}\n", b.name))
        .collect()
}

/// Prints notices. With `machine_output` stdout carries data only, so every
/// notice goes to `err`.
pub fn write_notices<O: Write, E: Write>(
    notices: &[Notice],
    mut out: O,
    mut err: E,
    machine_output: bool,
) -> Result<()> {
    for notice in notices {
        match notice {
            Notice::Success(message) if !machine_output => writeln!(out, "✅ {}", message)?,
            Notice::Info(message) if !machine_output => writeln!(out, "ℹ️  {}", message)?,
            Notice::Success(message) => writeln!(err, "✅ {}", message)?,
            Notice::Info(message) => writeln!(err, "ℹ️  {}", message)?,
            Notice::Error(message) => writeln!(err, "❌ {}", message)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DealStatus;
    use chrono::NaiveDate;

    fn deal(account: &str, customer: &str) -> Deal {
        Deal {
            timestamp: NaiveDate::from_ymd_opt(2026, 10, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            type_tag: "FIN-CLOSE".to_string(),
            branch: "Kochi".to_string(),
            customer_name: customer.to_string(),
            customer_id: "CUST-1".to_string(),
            account_number: account.to_string(),
            amount: 250000.0,
            scheme_code: "FD12".to_string(),
            roi: 7.25,
            maturity_date: NaiveDate::from_ymd_opt(2027, 4, 1).unwrap(),
            put_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
            certificate_url: String::new(),
            status: DealStatus::Open,
        }
    }

    #[test]
    fn test_table_has_header_and_one_line_per_deal() {
        let table = render_open_deals(&[deal("ACC100", "Asha Menon"), deal("ACC200", "Ravi")]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Customer"));
        assert!(lines[2].contains("ACC100"));
        assert!(lines[2].contains("250000"));
        assert!(lines[2].contains("01-04-2027"));
        assert!(lines[3].trim_end().ends_with('-'));
    }

    #[test]
    fn test_empty_table_message() {
        assert_eq!(render_open_deals(&[]), "No open deals available\n");
    }

    #[test]
    fn test_csv_export() {
        let mut out = Vec::new();
        write_open_deals_csv(&mut out, &[deal("ACC100", "Menon, Asha")]).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Customer,Account,Amt,Scheme,ROI,Maturity,Put,Branch,Certificate,Status"
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"Menon, Asha\",ACC100,250000,FD12,7.25,01-04-2027,01-01-2027,Kochi,,OPEN"
        );
    }

    #[test]
    fn test_csv_mode_keeps_notices_off_stdout() {
        let notices = vec![
            Notice::Info("No open deals available".to_string()),
            Notice::Error("Document upload failed".to_string()),
        ];

        let mut csv_out = Vec::new();
        write_open_deals_csv(&mut csv_out, &[]).unwrap();
        let mut err = Vec::new();
        write_notices(&notices, &mut csv_out, &mut err, true).unwrap();

        assert_eq!(
            String::from_utf8(csv_out).unwrap(),
            "Customer,Account,Amt,Scheme,ROI,Maturity,Put,Branch,Certificate,Status\n"
        );
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("No open deals available"));
        assert!(err.contains("Document upload failed"));
    }

    #[test]
    fn test_interactive_notices_split_by_kind() {
        let notices = vec![
            Notice::Success("Saved Successfully".to_string()),
            Notice::Error("Already taken by another branch".to_string()),
        ];
        let mut out = Vec::new();
        let mut err = Vec::new();
        write_notices(&notices, &mut out, &mut err, false).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "✅ Saved Successfully\n");
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "❌ Already taken by another branch\n"
        );
    }
}
