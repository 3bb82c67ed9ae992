use log::{debug, warn};

use super::core::AzureClient;
use crate::providers::azure::lookup::Lookup;
use crate::providers::azure::types::{
    extract_warnings, Build, BuildRef, ListResponse, Pipeline, Project, Timeline,
};

impl AzureClient {
    /// Names of every project in the organization.
    pub async fn list_projects(&self) -> Lookup<Vec<String>> {
        let url = self.endpoint(None, &["_apis", "projects"], &[]);

        self.get_json::<ListResponse<Project>>(&url)
            .await
            .map(|list| list.value.into_iter().map(|project| project.name).collect())
    }

    pub async fn list_pipelines(&self, project: &str) -> Lookup<Vec<Pipeline>> {
        let url = self.endpoint(Some(project), &["_apis", "pipelines"], &[]);

        self.get_json::<ListResponse<Pipeline>>(&url)
            .await
            .map(|list| list.value)
    }

    /// Id of the newest build of `pipeline_id` on the configured branch.
    ///
    /// The server orders builds newest first; only the top one is requested.
    /// An empty listing is `NotFound`.
    pub async fn latest_branch_build_id(&self, project: &str, pipeline_id: u64) -> Lookup<u64> {
        let branch_ref = self.settings().branch_ref();
        let definition = pipeline_id.to_string();
        let url = self.endpoint(
            Some(project),
            &["_apis", "build", "builds"],
            &[
                ("branchName", branch_ref.as_str()),
                ("definitions", definition.as_str()),
                ("$top", "1"),
            ],
        );

        let builds = match self.get_json::<ListResponse<BuildRef>>(&url).await.into_result() {
            Ok(list) => list.value,
            Err(miss) => return miss,
        };

        match builds.first() {
            Some(build) => Lookup::Found(build.id),
            None => {
                debug!("No {branch_ref} builds for pipeline {pipeline_id} in {project}");
                Lookup::NotFound
            }
        }
    }

    pub async fn build_detail(&self, project: &str, build_id: u64) -> Lookup<Build> {
        let id = build_id.to_string();
        let url = self.endpoint(Some(project), &["_apis", "build", "builds", id.as_str()], &[]);

        self.get_json(&url).await
    }

    /// Warning messages recorded on the build's execution timeline.
    ///
    /// The body is only parsed when it is non-empty and declared as JSON; any
    /// other response, or a parse failure, yields `Malformed`.
    pub async fn warnings(&self, project: &str, build_id: u64) -> Lookup<Vec<String>> {
        let id = build_id.to_string();
        let url = self.endpoint(
            Some(project),
            &["_apis", "build", "builds", id.as_str(), "timeline"],
            &[],
        );

        let fetched = match self.get(&url).await.into_result() {
            Ok(fetched) => fetched,
            Err(miss) => return miss,
        };

        if !fetched.is_json() {
            warn!("Timeline for build {build_id} in {project} is not JSON");
            return Lookup::Malformed("timeline response is not JSON".to_string());
        }

        if fetched.is_blank() {
            return Lookup::Malformed("empty timeline body".to_string());
        }

        match serde_json::from_slice::<Timeline>(&fetched.body) {
            Ok(timeline) => Lookup::Found(extract_warnings(timeline)),
            Err(e) => {
                warn!("Could not parse timeline for build {build_id} in {project}: {e}");
                Lookup::Malformed(e.to_string())
            }
        }
    }
}
