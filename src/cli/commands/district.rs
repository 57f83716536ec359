use crate::cli::parser::{Cli, Commands, DistrictAction, DistrictFields};
use crate::config::Config;
use crate::core::catalog::DistrictPatch;
use crate::errors::{AppError, AppResult};
use crate::models::district::District;
use crate::models::position::GeoPoint;
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::grey;
use crate::utils::formatting::{format_distance, yes_no};
use crate::utils::table::{Column, Table};

use super::{open_state, position};

/// `districts`: ranked catalog listing.
pub fn handle_list(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Districts { limit } = &cli.command {
        let origin = position(cli)?;
        let state = open_state(cfg)?;

        match origin {
            Some(p) => println!("📍 Position: {}", p),
            None => println!("📍 Position: {}", grey("unknown (catalog order)")),
        }

        if state.districts().is_empty() {
            info("No districts registered. Add one with `parkwatch district add --name ...`.");
            return Ok(());
        }

        let limit = limit.unwrap_or(cfg.list_limit);
        let active_id = state.session().map(|s| s.district_id.clone());

        println!("{}", render(&state.ranked(origin), limit, active_id.as_deref()));
    }

    Ok(())
}

fn render(ranked: &[(District, Option<f64>)], limit: usize, active: Option<&str>) -> String {
    let mut table = Table::new(vec![
        Column::new("", 1),
        Column::new("ID", 14),
        Column::new("NAME", 24),
        Column::new("DIST", 9),
        Column::new("FREE", 5),
        Column::new("EXIT", 7),
        Column::new("OP", 3),
        Column::new("LAT,LNG", 22),
    ]);

    for (d, dist) in ranked.iter().take(limit) {
        let marker = if Some(d.id.as_str()) == active { "*" } else { "" };
        table.add_row(vec![
            marker.to_string(),
            d.id.clone(),
            d.name.clone(),
            format_distance(*dist),
            format!("{}h", d.free_duration),
            format!("{}min", d.exit_duration),
            yes_no(d.needs_operation).to_string(),
            d.position().to_string(),
        ]);
    }

    table.render()
}

/// `district add|edit|rm`
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::District { action } = &cli.command {
        let here = position(cli)?;
        let mut state = open_state(cfg)?;

        match action {
            DistrictAction::Add(fields) => {
                let d = state.add_district(&to_patch(fields, here)?)?;
                success(format!("District '{}' added with id {}.", d.name, d.id));
            }
            DistrictAction::Edit { id, fields } => {
                let d = state.update_district(id, &to_patch(fields, here)?)?;
                success(format!("District '{}' ({}) updated.", d.name, d.id));
            }
            DistrictAction::Rm { id } => {
                let active = state.session().is_some_and(|s| &s.district_id == id);
                let d = state.remove_district(id)?;
                success(format!("District '{}' ({}) removed.", d.name, d.id));
                if active {
                    warning("The active session was parked there; run `parkwatch exit` to close it.");
                }
            }
        }
    }

    Ok(())
}

fn to_patch(fields: &DistrictFields, here: Option<GeoPoint>) -> AppResult<DistrictPatch> {
    let (lat, lng) = if fields.here {
        let p = here.ok_or_else(|| {
            AppError::InvalidPosition("--here needs a position (--at LAT,LNG)".into())
        })?;
        (Some(p.lat), Some(p.lng))
    } else {
        (fields.lat, fields.lng)
    };

    Ok(DistrictPatch {
        name: fields.name.clone(),
        lat,
        lng,
        needs_operation: fields.needs_operation,
        free_duration: fields.free_duration,
        exit_duration: fields.exit_duration,
        payment_account: fields.payment_account.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn here_requires_a_position() {
        let fields = DistrictFields {
            here: true,
            ..Default::default()
        };
        assert!(to_patch(&fields, None).is_err());

        let p = to_patch(&fields, Some(GeoPoint::new(1.0, 2.0))).unwrap();
        assert_eq!((p.lat, p.lng), (Some(1.0), Some(2.0)));
    }

    #[test]
    fn listing_respects_limit_and_marks_active() {
        let ranked: Vec<(District, Option<f64>)> = crate::models::district::seed_districts()
            .into_iter()
            .map(|d| (d, None))
            .collect();

        let out = render(&ranked, 1, Some("1"));
        assert!(out.contains("长江证券停车场"));
        assert!(!out.contains("SKP"));
        assert!(out.lines().nth(1).unwrap().starts_with('*'));
    }
}
