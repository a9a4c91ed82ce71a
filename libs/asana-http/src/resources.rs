//! Thin per-resource calls. Each one builds a [`RequestDescriptor`] and hands
//! it to the executor; none of them retry or classify errors themselves.

use asana_errors::CliError;
use tokio_util::sync::CancellationToken;
use url::form_urlencoded;

use crate::client::AsanaClient;
use crate::envelope::{DataEnvelope, ListResponse};
use crate::models::{Story, StoryCreateRequest, Task, User, Workspace};
use crate::request::RequestDescriptor;

/// Append `?k=v&...` to `path` when there is at least one parameter.
fn with_query<'a>(path: String, params: impl IntoIterator<Item = (&'a str, String)>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params {
        query.append_pair(key, &value);
        any = true;
    }
    if any {
        format!("{path}?{}", query.finish())
    } else {
        path
    }
}

fn segment(gid: &str) -> String {
    urlencoding::encode(gid).into_owned()
}

impl AsanaClient {
    /// `GET /users/me`
    ///
    /// # Errors
    ///
    /// Any [`CliError`] produced by the executor.
    pub async fn get_me(&self, cancel: &CancellationToken) -> Result<User, CliError> {
        let req = RequestDescriptor::get("/users/me").resource("user");
        let env: DataEnvelope<User> = self.execute(&req, cancel).await?;
        Ok(env.into_inner())
    }

    /// `GET /workspaces[?limit=N]`; a `limit` of `None` lets the server decide.
    ///
    /// # Errors
    ///
    /// Any [`CliError`] produced by the executor.
    pub async fn list_workspaces(
        &self,
        limit: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<ListResponse<Workspace>, CliError> {
        let path = with_query(
            "/workspaces".to_owned(),
            limit.map(|l| ("limit", l.to_string())),
        );
        self.execute(&RequestDescriptor::get(path), cancel).await
    }

    /// `GET /workspaces/{gid}`
    ///
    /// # Errors
    ///
    /// Any [`CliError`] produced by the executor; 404 reads `workspace not found`.
    pub async fn get_workspace(
        &self,
        gid: &str,
        cancel: &CancellationToken,
    ) -> Result<Workspace, CliError> {
        let req =
            RequestDescriptor::get(format!("/workspaces/{}", segment(gid))).resource("workspace");
        let env: DataEnvelope<Workspace> = self.execute(&req, cancel).await?;
        Ok(env.into_inner())
    }

    /// `GET /tasks/{gid}`
    ///
    /// # Errors
    ///
    /// Any [`CliError`] produced by the executor; 404 reads `task not found`.
    pub async fn get_task(&self, gid: &str, cancel: &CancellationToken) -> Result<Task, CliError> {
        let req = RequestDescriptor::get(format!("/tasks/{}", segment(gid))).resource("task");
        let env: DataEnvelope<Task> = self.execute(&req, cancel).await?;
        Ok(env.into_inner())
    }

    /// `DELETE /tasks/{gid}`; the response body is not decoded.
    ///
    /// # Errors
    ///
    /// Any [`CliError`] produced by the executor; 404 reads `task not found`.
    pub async fn delete_task(&self, gid: &str, cancel: &CancellationToken) -> Result<(), CliError> {
        let req = RequestDescriptor::delete(format!("/tasks/{}", segment(gid))).resource("task");
        self.execute_unit(&req, cancel).await
    }

    /// `GET /tasks/{gid}/stories[?limit=N&offset=X]`
    ///
    /// # Errors
    ///
    /// Any [`CliError`] produced by the executor; 404 reads `task not found`.
    pub async fn list_stories(
        &self,
        task_gid: &str,
        limit: Option<u32>,
        offset: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ListResponse<Story>, CliError> {
        let params = limit
            .map(|l| ("limit", l.to_string()))
            .into_iter()
            .chain(offset.map(|o| ("offset", o.to_owned())));
        let path = with_query(format!("/tasks/{}/stories", segment(task_gid)), params);
        self.execute(&RequestDescriptor::get(path).resource("task"), cancel)
            .await
    }

    /// `POST /tasks/{gid}/stories` with `{"data":{"text":...}}`
    ///
    /// # Errors
    ///
    /// Any [`CliError`] produced by the executor; 404 reads `task not found`.
    pub async fn add_comment(
        &self,
        task_gid: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Story, CliError> {
        let payload = DataEnvelope::new(StoryCreateRequest {
            text: text.to_owned(),
        });
        let req = RequestDescriptor::post(format!("/tasks/{}/stories", segment(task_gid)))
            .json(&payload)?
            .resource("task");
        let env: DataEnvelope<Story> = self.execute(&req, cancel).await?;
        Ok(env.into_inner())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::testing::{FakeTransport, json_response, status_response};
    use asana_errors::ErrorKind;
    use std::sync::Arc;

    fn client_with(fake: &Arc<FakeTransport>) -> AsanaClient {
        AsanaClient::builder(ClientConfig::for_testing("http://fake/api/1.0", "tok"))
            .transport_impl(fake.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn test_with_query() {
        assert_eq!(with_query("/w".to_owned(), None), "/w");
        assert_eq!(
            with_query("/w".to_owned(), [("limit", "5".to_owned())]),
            "/w?limit=5"
        );
        assert_eq!(
            with_query(
                "/s".to_owned(),
                [("limit", "5".to_owned()), ("offset", "a b&c".to_owned())]
            ),
            "/s?limit=5&offset=a+b%26c"
        );
    }

    #[test]
    fn test_segment_escapes_slashes() {
        assert_eq!(segment("123"), "123");
        assert_eq!(segment("../x"), "..%2Fx");
    }

    #[tokio::test]
    async fn test_get_me_unwraps_envelope() {
        let fake = FakeTransport::new(|_, _| {
            Ok(json_response(r#"{"data":{"gid":"u1","name":"Ada"}}"#))
        });
        let user = client_with(&fake)
            .get_me(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(user.gid, "u1");
        assert_eq!(fake.requests()[0].uri, "http://fake/api/1.0/users/me");
    }

    #[tokio::test]
    async fn test_list_workspaces_with_limit() {
        let fake = FakeTransport::new(|_, _| {
            Ok(json_response(
                r#"{"data":[{"gid":"w1","name":"Acme","is_organization":true}],"next_page":{"offset":"n1"}}"#,
            ))
        });
        let list = client_with(&fake)
            .list_workspaces(Some(10), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(list.data[0].name, "Acme");
        assert!(list.data[0].is_organization);
        assert_eq!(list.next_offset(), Some("n1"));
        assert_eq!(
            fake.requests()[0].uri,
            "http://fake/api/1.0/workspaces?limit=10"
        );
    }

    #[tokio::test]
    async fn test_get_task_not_found_names_task() {
        let fake = FakeTransport::new(|_, _| Ok(status_response(404, "")));
        let err = client_with(&fake)
            .get_task("42", &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "task not found");
    }

    #[tokio::test]
    async fn test_get_workspace_not_found_names_workspace() {
        let fake = FakeTransport::new(|_, _| Ok(status_response(404, "")));
        let err = client_with(&fake)
            .get_workspace("w9", &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.message(), "workspace not found");
    }

    #[tokio::test]
    async fn test_delete_task_ignores_body() {
        let fake = FakeTransport::new(|_, _| Ok(json_response(r#"{"data":{}}"#)));
        client_with(&fake)
            .delete_task("42", &CancellationToken::new())
            .await
            .unwrap();

        let seen = fake.requests();
        assert_eq!(seen[0].method, http::Method::DELETE);
        assert_eq!(seen[0].uri, "http://fake/api/1.0/tasks/42");
    }

    #[tokio::test]
    async fn test_add_comment_posts_wrapped_text() {
        let fake = FakeTransport::new(|_, _| {
            Ok(json_response(
                r#"{"data":{"gid":"s1","type":"comment","text":"looks good"}}"#,
            ))
        });
        let story = client_with(&fake)
            .add_comment("42", "looks good", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(story.text.as_deref(), Some("looks good"));
        let seen = fake.requests();
        assert_eq!(seen[0].method, http::Method::POST);
        assert_eq!(seen[0].uri, "http://fake/api/1.0/tasks/42/stories");
        assert_eq!(&seen[0].body[..], br#"{"data":{"text":"looks good"}}"#);
    }

    #[tokio::test]
    async fn test_list_stories_pagination_params() {
        let fake = FakeTransport::new(|_, _| Ok(json_response(r#"{"data":[]}"#)));
        let list = client_with(&fake)
            .list_stories("42", Some(20), Some("cursor"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(list.data.is_empty());
        assert_eq!(list.next_offset(), None);
        assert_eq!(
            fake.requests()[0].uri,
            "http://fake/api/1.0/tasks/42/stories?limit=20&offset=cursor"
        );
    }
}
