use url::Url;

/// Converts a build id to a clickable results page URL.
///
/// # Arguments
///
/// * `base_url` - Azure DevOps service root (e.g., <https://dev.azure.com>)
/// * `organization` - Organization name
/// * `project` - Project name, may contain spaces
/// * `build_id` - Numeric build id
///
/// # Returns
///
/// Clickable URL to the build (e.g., <https://dev.azure.com/org/project/_build/results?buildId=100>)
pub fn build_results_url(base_url: &str, organization: &str, project: &str, build_id: u64) -> String {
    let Ok(mut url) = Url::parse(base_url) else {
        return format!("{base_url}/{organization}/{project}/_build/results?buildId={build_id}");
    };

    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend([organization, project, "_build", "results"]);
    }
    url.query_pairs_mut()
        .append_pair("buildId", &build_id.to_string());

    url.to_string()
}
