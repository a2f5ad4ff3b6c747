//! Population and year-over-year change on the 1km mesh.

use mobility_map_compose::{MapArtifact, require_center};
use mobility_map_dataset_models::DatasetKey;
use mobility_map_geography::polygon;
use mobility_map_source::Transport;
use mobility_map_table::reshape::with_change_ratio;
use mobility_map_table::{DataFrame, JoinKind, TableError, drop_nulls, merge};

use crate::{PipelineContext, PipelineError, PipelineRequest};

/// Join key between mesh tables and the mesh reference.
pub const MESH_ID: &str = "mesh1kmid";
/// Population column of the mesh tables.
pub const POPULATION: &str = "population";
/// Change ratio column.
pub const DIFF: &str = "diff";

const DROP_SUFFIX: &str = "_drop";

/// Builds the comparison map for the mesh population dataset.
///
/// The first layer shows baseline-year population per mesh; the second
/// shows `current / baseline - 1` per mesh, omitting meshes whose baseline
/// is zero or missing.
///
/// # Errors
///
/// Returns [`PipelineError`] if a fetch fails, the data lacks a required
/// column, or the population layer has no coordinates to center on.
pub async fn run_mesh_comparison<T: Transport>(
    ctx: &PipelineContext<T>,
    request: &PipelineRequest,
) -> Result<MapArtifact, PipelineError> {
    let region = request.region_params()?;

    let mesh = ctx
        .fetcher
        .fetch(DatasetKey::Mesh1km, request.baseline_year, None)
        .await?;
    let current = ctx
        .fetcher
        .fetch(DatasetKey::Mdp, request.current_year, Some(region))
        .await?;
    let baseline = ctx
        .fetcher
        .fetch(DatasetKey::Mdp, request.baseline_year, Some(region))
        .await?;

    let current = request.filter(&current)?;
    let baseline = request.filter(&baseline)?;

    let population = with_mesh(&baseline, &mesh)?;
    let population_polygons = polygon::build(&population, POPULATION)?;
    let center = require_center(&population)?;

    let change = change_table(&current, &baseline, request)?;
    let change = drop_nulls(&with_mesh(&change, &mesh)?, &[DIFF])?;
    let change_polygons = polygon::build(&change, DIFF)?;

    log::info!(
        "Mesh comparison {}→{}: {} population meshes, {} change meshes",
        request.baseline_year,
        request.current_year,
        population_polygons.len(),
        change_polygons.len()
    );

    ctx.progress.set_message("Creating Map...".to_string());
    let artifact = ctx.composer.compose(
        &population_polygons,
        &change_polygons,
        center,
        request.selection.zoom_level(),
    );
    ctx.progress.finish_and_clear();

    Ok(artifact)
}

/// Attaches mesh corners and centers, discarding overlapping columns of the
/// mesh reference.
fn with_mesh(df: &DataFrame, mesh: &DataFrame) -> Result<DataFrame, TableError> {
    merge(df, mesh, MESH_ID, JoinKind::Left, ("", DROP_SUFFIX), true)
}

/// `mesh1kmid, diff` where `diff = population_<current> /
/// population_<baseline> - 1`.
fn change_table(
    current: &DataFrame,
    baseline: &DataFrame,
    request: &PipelineRequest,
) -> Result<DataFrame, TableError> {
    let current_suffix = format!("_{}", request.current_year);
    let baseline_suffix = format!("_{}", request.baseline_year);

    let joined = merge(
        current,
        baseline,
        MESH_ID,
        JoinKind::Left,
        (current_suffix.as_str(), baseline_suffix.as_str()),
        false,
    )?;

    let current_column = format!("{POPULATION}{current_suffix}");
    let baseline_column = format!("{POPULATION}{baseline_suffix}");

    Ok(with_change_ratio(&joined, &current_column, &baseline_column, DIFF)?.select([MESH_ID, DIFF])?)
}

#[cfg(test)]
mod tests {
    use mobility_map_compose::CompareMode;
    use mobility_map_table::{float_values, read_csv};

    use super::*;
    use crate::testing::*;

    #[tokio::test]
    async fn builds_population_and_change_layers() {
        let ctx = context(mesh_transport());

        let artifact = run_mesh_comparison(&ctx, &tokyo_april(DatasetKey::Mdp))
            .await
            .unwrap();

        assert_eq!(artifact.mode, CompareMode::Linked);
        assert_eq!(artifact.view.zoom, 9);
        assert!((artifact.view.center.lat - 35.005).abs() < 1e-9);
        assert!((artifact.view.center.lon - 139.01875).abs() < 1e-9);

        assert_eq!(artifact.first.value_column, POPULATION);
        assert_eq!(artifact.first.data.features.len(), 3);
        assert_eq!(artifact.first.legend.min_label, "0");
        assert_eq!(artifact.first.legend.max_label, "200");

        // mesh 3 has a zero baseline
        assert_eq!(artifact.second.value_column, DIFF);
        assert_eq!(artifact.second.data.features.len(), 2);
        assert_eq!(artifact.second.legend.min_label, "-10.00%");
        assert_eq!(artifact.second.legend.max_label, "25.00%");
    }

    #[tokio::test]
    async fn city_selection_narrows_and_zooms() {
        let ctx = context(mesh_transport());
        let mut request = tokyo_april(DatasetKey::Mdp);
        request.selection = request.selection.with_city(13101);

        let artifact = run_mesh_comparison(&ctx, &request).await.unwrap();

        assert_eq!(artifact.view.zoom, 11);
        assert_eq!(artifact.first.data.features.len(), 2);
    }

    #[tokio::test]
    async fn repeated_runs_reuse_downloads() {
        let ctx = context(mesh_transport());
        let request = tokyo_april(DatasetKey::Mdp);

        run_mesh_comparison(&ctx, &request).await.unwrap();
        assert_eq!(ctx.fetcher.transport().requests(), 3);

        run_mesh_comparison(&ctx, &request).await.unwrap();
        assert_eq!(ctx.fetcher.transport().requests(), 3);
    }

    #[tokio::test]
    async fn missing_archive_is_a_network_error() {
        let ctx = context(RoutedTransport::default());

        let err = run_mesh_comparison(&ctx, &tokyo_april(DatasetKey::Mdp))
            .await
            .unwrap_err();

        assert_eq!(
            err.user_message(),
            "データの取得に失敗しました: ネットワークエラーが発生しました"
        );
    }

    #[tokio::test]
    async fn empty_selection_cannot_be_displayed() {
        let ctx = context(mesh_transport());
        let mut request = tokyo_april(DatasetKey::Mdp);
        request.selection = request.selection.with_city(99999);

        let err = run_mesh_comparison(&ctx, &request).await.unwrap_err();

        assert_eq!(err.user_message(), "地図表示できません。");
    }

    #[test]
    fn change_uses_year_suffixes() {
        let current = read_csv("mesh1kmid,population\n1,250\n".as_bytes()).unwrap();
        let baseline = read_csv("mesh1kmid,population\n1,200\n".as_bytes()).unwrap();
        let request = tokyo_april(DatasetKey::Mdp);

        let change = change_table(&current, &baseline, &request).unwrap();

        assert_eq!(change.get_column_names(), [MESH_ID, DIFF]);
        let diff = float_values(&change, DIFF).unwrap()[0].unwrap();
        assert!((diff - 0.25).abs() < 1e-9);
    }
}
