use std::path::Path;

use rust_xlsxwriter::{Format, Table, TableColumn, Workbook};

use crate::error::Result;
use crate::flatten::{Cell, WorkbookData};

/// Writes the flattened graph to an `.xlsx` file, one Excel table per sheet.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let header_format = Format::new().set_bold();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let sheet_row = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(value) => {
                        worksheet.write_string(sheet_row, col_idx as u16, value)?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_number(sheet_row, col_idx as u16, *value)?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        // Excel refuses tables without a data row.
        if !table.rows.is_empty() && !table.columns.is_empty() {
            let headers: Vec<TableColumn> = table
                .columns
                .iter()
                .map(|header| TableColumn::new().set_header(header))
                .collect();
            let mut excel_table = Table::new();
            excel_table.set_autofilter(true).set_columns(&headers);
            let col_end = (table.columns.len() as u16).saturating_sub(1);
            worksheet.add_table(0, 0, table.rows.len() as u32, col_end, &excel_table)?;
        }
        worksheet.autofit();
    }

    workbook_writer.save(path)?;
    Ok(())
}
