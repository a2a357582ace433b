use std::path::Path;

use anyhow::{Result, bail};
use eqgft_core::SensitivityCurve;
use eqgft_core::sensitivity::{DISCOVERY_SIGMA, PLANNED_EVENTS};
use plotters::prelude::*;

/// Render σ(N) on log-log axes with the 5σ discovery line and the planned
/// run size marked.
pub fn render_sensitivity(curve: &SensitivityCurve, path: &Path) -> Result<()> {
    let (Some(&(n_min, sigma_first)), Some(&(n_max, sigma_last))) =
        (curve.points.first(), curve.points.last())
    else {
        bail!("sensitivity curve has no points");
    };
    if !(sigma_first > 0.0) {
        bail!("sensitivity curve needs a non-zero asymmetry");
    }
    let y_min = sigma_first.min(DISCOVERY_SIGMA) * 0.5;
    let y_max = sigma_last.max(DISCOVERY_SIGMA) * 2.0;

    let root = SVGBackend::new(path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "EQGFT Sensitivity: Polarization Asymmetry Detection",
            ("sans-serif", 20),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((n_min..n_max).log_scale(), (y_min..y_max).log_scale())?;

    chart
        .configure_mesh()
        .x_desc("Number of events (N)")
        .y_desc("Significance (σ)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(curve.points.iter().copied(), &BLUE))?
        .label("σ = |A| / δA")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .draw_series(LineSeries::new(
            vec![(n_min, DISCOVERY_SIGMA), (n_max, DISCOVERY_SIGMA)],
            &RED,
        ))?
        .label("5σ discovery")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    if (n_min..=n_max).contains(&PLANNED_EVENTS) {
        chart
            .draw_series(LineSeries::new(
                vec![(PLANNED_EVENTS, y_min), (PLANNED_EVENTS, y_max)],
                &GREEN,
            ))?
            .label("N = 200,000")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GREEN));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    tracing::info!("sensitivity curve written to {}", path.display());
    Ok(())
}
