//! Rendering of comparison reports as JSON documents and text tables.

pub mod residuals {
    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use std::io::{self, Write};

    const LEG_HEADER: &str = "leg  from       to         tof_days      dep_pos_km    dep_vel_km_s  arr_pos_km    arr_vel_km_s  status";

    /// Boundary point of the patched-conic trajectory.
    #[derive(Debug, Clone, Serialize, PartialEq)]
    pub struct BoundaryRecord {
        pub index: usize,
        pub label: String,
        pub epoch_s: f64,
        pub position_km: [f64; 3],
        pub delta_v_km_s: f64,
    }

    /// Endpoint residuals of one evaluation leg, or its failure.
    #[derive(Debug, Clone, Serialize, PartialEq)]
    pub struct LegRecord {
        pub index: usize,
        pub from: String,
        pub to: String,
        pub time_of_flight_days: f64,
        pub start_epoch_s: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub residual: Option<ResidualRecord>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub error: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, PartialEq)]
    pub struct ResidualRecord {
        pub departure: [f64; 6],
        pub arrival: [f64; 6],
        pub departure_position_error_km: f64,
        pub departure_velocity_error_km_s: f64,
        pub arrival_position_error_km: f64,
        pub arrival_velocity_error_km_s: f64,
    }

    #[derive(Debug, Clone, Serialize, PartialEq)]
    pub struct ResidualReport {
        pub scenario: String,
        pub total_delta_v_km_s: f64,
        pub times_of_flight_days: Vec<f64>,
        pub boundaries: Vec<BoundaryRecord>,
        pub legs: Vec<LegRecord>,
        pub complete: bool,
    }

    /// Pretty-printed JSON document.
    pub fn write_json(writer: &mut dyn Write, report: &ResidualReport) -> io::Result<()> {
        to_writer_pretty(&mut *writer, report)?;
        writeln!(writer)
    }

    /// Human-readable summary: boundaries, then one row per evaluation leg.
    pub fn write_table(writer: &mut dyn Write, report: &ResidualReport) -> io::Result<()> {
        writeln!(writer, "scenario: {}", report.scenario)?;
        writeln!(
            writer,
            "patched-conic delta-v: {:.6} km/s",
            report.total_delta_v_km_s
        )?;
        writeln!(writer)?;
        for boundary in &report.boundaries {
            writeln!(
                writer,
                "boundary {:>2}  {:<10} epoch {:>16.3} s  dv {:>10.6} km/s",
                boundary.index, boundary.label, boundary.epoch_s, boundary.delta_v_km_s
            )?;
        }
        writeln!(writer)?;
        writeln!(writer, "{LEG_HEADER}")?;
        for leg in &report.legs {
            match (&leg.residual, &leg.error) {
                (Some(residual), _) => writeln!(
                    writer,
                    "{:<4} {:<10} {:<10} {:<13.6} {:<13.6e} {:<13.6e} {:<13.6e} {:<13.6e} ok",
                    leg.index,
                    leg.from,
                    leg.to,
                    leg.time_of_flight_days,
                    residual.departure_position_error_km,
                    residual.departure_velocity_error_km_s,
                    residual.arrival_position_error_km,
                    residual.arrival_velocity_error_km_s,
                )?,
                (None, error) => writeln!(
                    writer,
                    "{:<4} {:<10} {:<10} {:<13.6} {:<55} failed: {}",
                    leg.index,
                    leg.from,
                    leg.to,
                    leg.time_of_flight_days,
                    "-",
                    error.as_deref().unwrap_or("unknown error"),
                )?,
            }
        }
        if report.legs.is_empty() {
            writeln!(writer, "(no evaluation legs)")?;
        }
        Ok(())
    }
}
