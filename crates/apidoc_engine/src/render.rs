/* 📖 # What does a rendered route look like?

Every route becomes one markdown fragment, opened by `<!-- START_<id> -->` and closed by
`<!-- END_<id> -->`. Between the markers: a heading, the description, a curl and a
javascript example request, example responses, the list of HTTP methods and the parameter
tables. The markers are the only thing the merge engine relies on; everything between
them is free to change, including by hand in the published document.
*/

use std::fmt;

use crate::extractor::PLACEHOLDER;
use crate::summary::{ParameterSpec, RouteId, RouteSummary};

/// A route rendered to its delimited markdown fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRoute {
    pub id: RouteId,
    /// `[METHODS] uri`, used to name the route in warnings.
    pub label: String,
    pub group: String,
    /// The fragment, markers included, without a trailing newline.
    pub text: String,
}

/// Example request URL: base URL plus the URI with placeholders emptied.
pub fn example_url(base_url: &str, uri: &str) -> String {
    let path = PLACEHOLDER.replace_all(uri.trim_start_matches('/'), "");
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Renders route summaries into markdown fragments.
#[derive(Debug, Clone)]
pub struct Renderer {
    base_url: String,
}

impl Renderer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn render(&self, route: &RouteSummary) -> RenderedRoute {
        RenderedRoute {
            id: route.id.clone(),
            label: route.label(),
            group: route.resource_group.clone(),
            text: RouteFragment {
                route,
                base_url: &self.base_url,
            }
            .to_string(),
        }
    }

    pub fn render_all(&self, routes: &[RouteSummary]) -> Vec<RenderedRoute> {
        routes.iter().map(|route| self.render(route)).collect()
    }
}

struct RouteFragment<'a> {
    route: &'a RouteSummary,
    base_url: &'a str,
}

impl RouteFragment<'_> {
    fn heading(&self) -> &str {
        if self.route.title.is_empty() {
            &self.route.uri
        } else {
            &self.route.title
        }
    }

    fn write_curl(&self, f: &mut fmt::Formatter<'_>, url: &str) -> fmt::Result {
        let mut lines = vec![
            format!("curl -X {} \"{}\"", self.route.primary_method(), url),
            "    -H \"Accept: application/json\"".to_string(),
        ];
        lines.extend(
            self.route
                .all_parameters()
                .map(|param| format!("    -d \"{}\"=\"\"", param.name)),
        );
        writeln!(f, "```bash")?;
        writeln!(f, "{}", lines.join(" \\\n"))?;
        writeln!(f, "```")
    }

    fn write_javascript(&self, f: &mut fmt::Formatter<'_>, url: &str) -> fmt::Result {
        writeln!(f, "```javascript")?;
        writeln!(f, "var settings = {{")?;
        writeln!(f, "    \"async\": true,")?;
        writeln!(f, "    \"crossDomain\": true,")?;
        writeln!(f, "    \"url\": \"{}\",", url)?;
        writeln!(f, "    \"method\": \"{}\",", self.route.primary_method())?;
        let data: Vec<String> = self
            .route
            .all_parameters()
            .map(|param| format!("        \"{}\": \"\"", param.name))
            .collect();
        if !data.is_empty() {
            writeln!(f, "    \"data\": {{")?;
            writeln!(f, "{}", data.join(",\n"))?;
            writeln!(f, "    }},")?;
        }
        writeln!(f, "    \"headers\": {{")?;
        writeln!(f, "        \"accept\": \"application/json\"")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}")?;
        writeln!(f)?;
        writeln!(f, "$.ajax(settings).done(function (response) {{")?;
        writeln!(f, "    console.log(response);")?;
        writeln!(f, "}});")?;
        writeln!(f, "```")
    }

    fn write_responses(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.route.responses.is_empty() {
            writeln!(f, "> Never returns anything")?;
            return writeln!(f);
        }
        for body in &self.route.responses {
            writeln!(f, "> Example response:")?;
            writeln!(f)?;
            writeln!(f, "```json")?;
            writeln!(f, "{}", body)?;
            writeln!(f, "```")?;
            writeln!(f)?;
        }
        Ok(())
    }
}

fn write_table(f: &mut fmt::Formatter<'_>, title: &str, params: &[ParameterSpec]) -> fmt::Result {
    if params.is_empty() {
        return Ok(());
    }
    writeln!(f, "#### {}", title)?;
    writeln!(f)?;
    writeln!(f, "Parameter | Type | Required | Description | Rules")?;
    writeln!(f, "--------- | ---- | -------- | ----------- | -----")?;
    for param in params {
        writeln!(
            f,
            "{} | {} | {} | {} | {}",
            param.name,
            param.param_type.as_deref().unwrap_or(""),
            if param.required { "required" } else { "optional" },
            param.description,
            param.rules.join(", ")
        )?;
    }
    writeln!(f)
}

impl fmt::Display for RouteFragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route = self.route;
        let url = example_url(self.base_url, &route.uri);

        writeln!(f, "{}", route.id.start_marker())?;
        writeln!(f, "## {}", self.heading())?;
        if !route.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", route.description)?;
        }
        writeln!(f)?;
        writeln!(f, "> Example request:")?;
        writeln!(f)?;
        self.write_curl(f, &url)?;
        writeln!(f)?;
        self.write_javascript(f, &url)?;
        writeln!(f)?;
        self.write_responses(f)?;

        writeln!(f, "### HTTP Request")?;
        for method in &route.methods {
            writeln!(f, "`{} {}`", method, route.uri)?;
            writeln!(f)?;
        }
        write_table(f, "Path parameters", &route.path_parameters)?;
        write_table(f, "Query parameters", &route.query_parameters)?;
        f.write_str(&route.id.end_marker())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::tests::summary;
    use expect_test::expect;

    fn show_user() -> RouteSummary {
        let mut route = summary("Users", "api/users/{id}", &["GET", "HEAD"]);
        route.title = "Show a user.".to_string();
        route.description = "Returns the user with the given id.".to_string();
        route.path_parameters.push(ParameterSpec {
            name: "id".to_string(),
            param_type: Some("model_id".to_string()),
            required: true,
            default: None,
            rules: vec!["required".to_string()],
            description: "User id".to_string(),
        });
        route.responses.push("{\n  \"id\": 4\n}".to_string());
        route
    }

    #[test]
    fn test_example_url_empties_placeholders() {
        assert_eq!(
            example_url("http://localhost/", "api/users/{id}/posts/{post?}"),
            "http://localhost/api/users//posts/"
        );
        assert_eq!(example_url("http://localhost", "/ping"), "http://localhost/ping");
    }

    #[test]
    fn test_render_full_route() {
        let rendered = Renderer::new("http://localhost/").render(&show_user());
        assert_eq!(rendered.label, "[GET,HEAD] api/users/{id}");
        assert_eq!(rendered.group, "Users");
        expect![[r#"
            <!-- START_ca853aae74e0f5ee754f8fa1c94d7f80 -->
            ## Show a user.

            Returns the user with the given id.

            > Example request:

            ```bash
            curl -X GET "http://localhost/api/users/" \
                -H "Accept: application/json" \
                -d "id"=""
            ```

            ```javascript
            var settings = {
                "async": true,
                "crossDomain": true,
                "url": "http://localhost/api/users/",
                "method": "GET",
                "data": {
                    "id": ""
                },
                "headers": {
                    "accept": "application/json"
                }
            }

            $.ajax(settings).done(function (response) {
                console.log(response);
            });
            ```

            > Example response:

            ```json
            {
              "id": 4
            }
            ```

            ### HTTP Request
            `GET api/users/{id}`

            `HEAD api/users/{id}`

            #### Path parameters

            Parameter | Type | Required | Description | Rules
            --------- | ---- | -------- | ----------- | -----
            id | model_id | required | User id | required

            <!-- END_ca853aae74e0f5ee754f8fa1c94d7f80 -->"#]]
        .assert_eq(&rendered.text);
    }

    #[test]
    fn test_render_minimal_route() {
        let route = summary("Unclassified", "api/users", &["GET"]);
        let rendered = Renderer::new("http://localhost").render(&route);
        expect![[r#"
            <!-- START_624079c20142314239cc5d60026a22c2 -->
            ## api/users

            > Example request:

            ```bash
            curl -X GET "http://localhost/api/users" \
                -H "Accept: application/json"
            ```

            ```javascript
            var settings = {
                "async": true,
                "crossDomain": true,
                "url": "http://localhost/api/users",
                "method": "GET",
                "headers": {
                    "accept": "application/json"
                }
            }

            $.ajax(settings).done(function (response) {
                console.log(response);
            });
            ```

            > Never returns anything

            ### HTTP Request
            `GET api/users`

            <!-- END_624079c20142314239cc5d60026a22c2 -->"#]]
        .assert_eq(&rendered.text);
    }

    #[test]
    fn test_query_table_follows_path_table() {
        let mut route = show_user();
        let mut name = ParameterSpec::untyped("name", false);
        name.rules = vec!["required".to_string(), "max:255".to_string()];
        route.query_parameters.push(name);

        let text = Renderer::new("http://localhost").render(&route).text;

        let path = text.find("#### Path parameters").unwrap();
        let query = text.find("#### Query parameters").unwrap();
        assert!(path < query);
        assert!(text.contains("name |  | optional |  | required, max:255\n"));
        assert!(text.contains("    -d \"id\"=\"\" \\\n    -d \"name\"=\"\"\n"));
    }

    #[test]
    fn test_response_bodies_are_rendered_verbatim() {
        let mut route = summary("Users", "api/users", &["GET"]);
        route.responses.push("{\"data\":[]}".to_string());
        route.responses.push("<html>not json</html>".to_string());
        let text = Renderer::new("http://localhost").render(&route).text;
        assert!(text.contains("```json\n{\"data\":[]}\n```\n"));
        assert!(text.contains("```json\n<html>not json</html>\n```\n"));
    }
}
