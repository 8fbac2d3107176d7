//! CSV export for per-interval rows and aggregated tables.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::aggregate::{BatteryTotals, BoilerTotals, PeriodSummary};
use crate::sim::types::{BatteryStepResult, BoilerStepResult};

const BATTERY_HEADER: &str = "timestamp,hour,weekday,surplus_kwh,charge_kwh,soc_percent,\
                              charged_kwh,discharged_kwh,wasted_kwh,\
                              grid_import_without_kwh,grid_export_without_kwh,\
                              grid_import_with_kwh,grid_export_with_kwh,\
                              import_savings,export_loss,net_savings";

const BOILER_HEADER: &str = "timestamp,hour,weekday,surplus_kwh,water_temp_c,heat_energy_kwh,\
                             hot_water_demand_l,energy_needed_kwh,energy_used_kwh,heat_loss_kwh,\
                             gas_needed_m3,gas_saved_m3,savings";

const BATTERY_PERIOD_HEADER: &str = "period,start,intervals,surplus_kwh,positive_surplus_kwh,\
                                     charged_kwh,discharged_kwh,wasted_kwh,\
                                     grid_import_without_kwh,grid_import_with_kwh,\
                                     grid_export_without_kwh,grid_export_with_kwh,\
                                     import_savings,export_loss,net_savings,\
                                     utilization_percent,round_trip_percent";

const BOILER_PERIOD_HEADER: &str = "period,start,intervals,surplus_kwh,positive_surplus_kwh,\
                                    hot_water_l,energy_needed_kwh,energy_used_kwh,heat_loss_kwh,\
                                    gas_needed_m3,gas_saved_m3,savings,\
                                    utilization_percent,coverage_percent";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn write_table<W, I>(header: &str, records: I, writer: W) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = Vec<String>>,
{
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(header.split(',').map(str::trim))?;
    for record in records {
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn to_path(
    path: &Path,
    write: impl FnOnce(io::BufWriter<File>) -> io::Result<()>,
) -> io::Result<()> {
    let file = File::create(path)?;
    write(io::BufWriter::new(file))
}

/// Writes per-interval battery rows as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_battery_csv(rows: &[BatteryStepResult], writer: impl Write) -> io::Result<()> {
    let records = rows.iter().map(|r| {
        vec![
            r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            r.hour.to_string(),
            r.weekday.to_string(),
            format!("{:.4}", r.surplus_kwh),
            format!("{:.4}", r.charge_kwh),
            format!("{:.2}", r.soc_percent),
            format!("{:.4}", r.charged_kwh),
            format!("{:.4}", r.discharged_kwh),
            format!("{:.4}", r.wasted_kwh),
            format!("{:.4}", r.grid_import_without_kwh),
            format!("{:.4}", r.grid_export_without_kwh),
            format!("{:.4}", r.grid_import_with_kwh),
            format!("{:.4}", r.grid_export_with_kwh),
            format!("{:.4}", r.import_savings),
            format!("{:.4}", r.export_loss),
            format!("{:.4}", r.net_savings),
        ]
    });
    write_table(BATTERY_HEADER, records, writer)
}

/// Writes per-interval boiler rows as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_boiler_csv(rows: &[BoilerStepResult], writer: impl Write) -> io::Result<()> {
    let records = rows.iter().map(|r| {
        vec![
            r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            r.hour.to_string(),
            r.weekday.to_string(),
            format!("{:.4}", r.surplus_kwh),
            format!("{:.2}", r.water_temp_c),
            format!("{:.4}", r.heat_energy_kwh),
            format!("{:.2}", r.hot_water_demand_l),
            format!("{:.4}", r.energy_needed_kwh),
            format!("{:.4}", r.energy_used_kwh),
            format!("{:.5}", r.heat_loss_kwh),
            format!("{:.5}", r.gas_needed_m3),
            format!("{:.5}", r.gas_saved_m3),
            format!("{:.4}", r.savings),
        ]
    });
    write_table(BOILER_HEADER, records, writer)
}

/// Writes an aggregated battery table as CSV.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_battery_periods_csv(
    groups: &[PeriodSummary<BatteryTotals>],
    writer: impl Write,
) -> io::Result<()> {
    let records = groups.iter().map(|g| {
        let t = &g.totals;
        vec![
            g.label.clone(),
            g.start.to_string(),
            g.intervals.to_string(),
            format!("{:.4}", t.surplus_kwh),
            format!("{:.4}", t.positive_surplus_kwh),
            format!("{:.4}", t.charged_kwh),
            format!("{:.4}", t.discharged_kwh),
            format!("{:.4}", t.wasted_kwh),
            format!("{:.4}", t.grid_import_without_kwh),
            format!("{:.4}", t.grid_import_with_kwh),
            format!("{:.4}", t.grid_export_without_kwh),
            format!("{:.4}", t.grid_export_with_kwh),
            format!("{:.4}", t.import_savings),
            format!("{:.4}", t.export_loss),
            format!("{:.4}", t.net_savings),
            format!("{:.2}", t.utilization_percent),
            format!("{:.2}", t.round_trip_percent),
        ]
    });
    write_table(BATTERY_PERIOD_HEADER, records, writer)
}

/// Writes an aggregated boiler table as CSV.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_boiler_periods_csv(
    groups: &[PeriodSummary<BoilerTotals>],
    writer: impl Write,
) -> io::Result<()> {
    let records = groups.iter().map(|g| {
        let t = &g.totals;
        vec![
            g.label.clone(),
            g.start.to_string(),
            g.intervals.to_string(),
            format!("{:.4}", t.surplus_kwh),
            format!("{:.4}", t.positive_surplus_kwh),
            format!("{:.2}", t.hot_water_l),
            format!("{:.4}", t.energy_needed_kwh),
            format!("{:.4}", t.energy_used_kwh),
            format!("{:.5}", t.heat_loss_kwh),
            format!("{:.5}", t.gas_needed_m3),
            format!("{:.5}", t.gas_saved_m3),
            format!("{:.4}", t.savings),
            format!("{:.2}", t.utilization_percent),
            format!("{:.2}", t.coverage_percent),
        ]
    });
    write_table(BOILER_PERIOD_HEADER, records, writer)
}

/// Exports battery rows to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_battery_csv(rows: &[BatteryStepResult], path: &Path) -> io::Result<()> {
    to_path(path, |w| write_battery_csv(rows, w))
}

/// Exports boiler rows to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_boiler_csv(rows: &[BoilerStepResult], path: &Path) -> io::Result<()> {
    to_path(path, |w| write_boiler_csv(rows, w))
}

/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_battery_periods_csv(
    groups: &[PeriodSummary<BatteryTotals>],
    path: &Path,
) -> io::Result<()> {
    to_path(path, |w| write_battery_periods_csv(groups, w))
}

/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_boiler_periods_csv(
    groups: &[PeriodSummary<BoilerTotals>],
    path: &Path,
) -> io::Result<()> {
    to_path(path, |w| write_boiler_periods_csv(groups, w))
}
