//! Request/response contract tests against a mock backend.

#[cfg(test)]
mod api_contract_tests {
    use std::future::Future;
    use std::sync::Arc;

    use serde::Serialize;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::types::{
        CreateModelRequest, CreatePromptRequest, GenerateRequest, StartTrainingRequest,
        TrainingModelRequest, UpdateModelRequest, UpdatePromptRequest, UpdateProfileRequest,
    };
    use crate::api::upload::UploadFile;
    use crate::api::{
        auth, community, generation, models, search, tags, training, upload, user, ApiClient,
        ApiError, Envelope, ErrorKind, PageRequest,
    };
    use crate::session::{MemorySessionStore, SessionStore};

    // ── Helpers ──────────────────────────────────────────────────────────

    fn envelope(data: Value) -> Value {
        json!({
            "success": true,
            "message": "OK",
            "data": data,
            "timestamp": "2025-03-01T12:00:00"
        })
    }

    fn model_json(id: i64) -> Value {
        json!({
            "id": id,
            "userId": 1,
            "userNickname": "mina",
            "title": format!("Model {}", id),
            "description": "test model",
            "trainingImagesCount": 10,
            "baseModel": "stable-diffusion-xl",
            "isPublic": true,
            "status": "COMPLETED",
            "viewCount": 0,
            "likeCount": 0,
            "favoriteCount": 0,
            "createdAt": "2025-03-01T12:00:00",
            "updatedAt": "2025-03-01T12:00:00"
        })
    }

    /// Page `number` of a fixture of `total` models, as the backend would slice it.
    fn model_page(total: i64, number: u32, size: u32) -> Value {
        let start = i64::from(number) * i64::from(size);
        let end = (start + i64::from(size)).min(total);
        let content: Vec<Value> = (start..end).map(model_json).collect();
        let total_pages = (total + i64::from(size) - 1) / i64::from(size);
        json!({
            "content": content,
            "totalElements": total,
            "totalPages": total_pages,
            "size": size,
            "number": number
        })
    }

    fn client_with(server: &MockServer, store: &MemorySessionStore) -> ApiClient {
        ApiClient::new(&server.uri(), Arc::new(store.clone()))
    }

    // ── Normalization ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_success_data_matches_body() {
        let server = MockServer::start().await;
        let data = json!([
            {"id": 1, "name": "anime", "category": "style", "usageCount": 12},
            {"id": 2, "name": "portrait", "category": "subject", "usageCount": 3}
        ]);
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(data.clone())))
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::new());
        let env = tags::get_all_tags(&client).await.unwrap();

        assert!(env.success);
        assert_eq!(env.message, "OK");
        assert_eq!(env.timestamp, "2025-03-01T12:00:00");
        assert_eq!(serde_json::to_value(&env.data).unwrap(), data);
    }

    #[tokio::test]
    async fn test_backend_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/models/99"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "success": false,
                "message": "Model not found",
                "data": null
            })))
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::new());
        let err = models::get_model_detail(&client, 99).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Application);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), "Model not found");
    }

    #[tokio::test]
    async fn test_undecodable_error_body_falls_back_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::new());
        let err = crate::api::user::get_my_profile(&client).await.unwrap_err();

        assert_eq!(err.message(), "HTTP Error: 500");
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags/popular"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::new());
        let err = tags::get_popular_tags(&client).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let client = ApiClient::new("http://127.0.0.1:1", Arc::new(MemorySessionStore::new()));
        let err = tags::get_all_tags(&client).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status(), None);
    }

    // ── Headers ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_bearer_header_attached_when_token_stored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(header("authorization", "Bearer access-123"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({"id": 1}))))
            .expect(1)
            .mount(&server)
            .await;

        let store = MemorySessionStore::with_tokens("access-123", "refresh-123");
        let client = client_with(&server, &store);
        let env = auth::get_current_user(&client).await.unwrap();
        assert_eq!(env.data["id"], 1);
    }

    #[tokio::test]
    async fn test_no_bearer_header_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::new());
        let err = auth::get_current_user(&client).await.unwrap_err();
        assert!(err.is_unauthorized());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_token_is_read_per_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
            .mount(&server)
            .await;

        let store = MemorySessionStore::new();
        let client = client_with(&server, &store);
        tags::get_all_tags(&client).await.unwrap();
        store.set_tokens("late-token", "r");
        tags::get_all_tags(&client).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
        assert_eq!(
            requests[1].headers.get("authorization").unwrap(),
            "Bearer late-token"
        );
    }

    // ── Pagination and queries ───────────────────────────────────────────

    #[tokio::test]
    async fn test_first_page_of_45_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/models"))
            .and(query_param("page", "0"))
            .and(query_param("size", "20"))
            .and(query_param("sort", "createdAt,DESC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(model_page(45, 0, 20))))
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::new());
        let page = models::get_public_models(&client, PageRequest::default())
            .await
            .unwrap()
            .data;

        assert_eq!(page.content.len(), 20);
        assert_eq!(page.total_elements, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.number, 0);
        assert!(page.content.len() <= page.size as usize);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_filter_by_tags_repeats_parameter_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/models/filter"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(model_page(0, 0, 20))))
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::new());
        models::filter_by_tags(&client, &["red", "blue"], PageRequest::default())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or_default().to_string();
        let red = query.find("tags=red").expect("tags=red missing");
        let blue = query.find("tags=blue").expect("tags=blue missing");
        assert!(red < blue);
    }

    #[tokio::test]
    async fn test_search_query_is_percent_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .and(query_param("query", "blue hair & wings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "models": model_page(1, 0, 20),
                "users": {
                    "content": [{
                        "id": 5, "email": "a@b.c", "name": "A", "nickname": "ace",
                        "profileImageUrl": "", "role": "USER", "createdAt": "c",
                        "modelsCount": 2
                    }],
                    "totalElements": 1, "totalPages": 1, "size": 20, "number": 0
                }
            }))))
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::new());
        let result = search::search_all(&client, "blue hair & wings", PageRequest::default())
            .await
            .unwrap()
            .data;

        assert_eq!(result.models.content.len(), 1);
        assert_eq!(result.users.content[0].user.nickname, "ace");
        assert_eq!(result.users.content[0].models_count, 2);
    }

    // ── Bodies ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_reply_comment_carries_parent_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/models/3/comments"))
            .and(body_json(json!({"content": "agreed", "parentCommentId": 11})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "id": 12, "modelId": 3, "userId": 1, "userNickname": "mina",
                "userProfileImageUrl": "", "content": "agreed", "likeCount": 0,
                "isLiked": false, "createdAt": "c"
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::with_tokens("a", "r"));
        let comment = community::create_comment(&client, 3, "agreed", Some(11))
            .await
            .unwrap()
            .data;
        assert_eq!(comment.id, 12);
        assert_eq!(comment.replies, None);
    }

    #[tokio::test]
    async fn test_toggle_like_returns_server_state() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/models/3/like"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({"liked": false}))))
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::with_tokens("a", "r"));
        let state = community::toggle_like(&client, 3).await.unwrap().data;
        assert!(!state.liked);
    }

    #[tokio::test]
    async fn test_cancel_job_reports_failure_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/training/jobs/8/fail"))
            .and(body_json(json!({"error": "User cancelled"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(Value::Null)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::with_tokens("a", "r"));
        let env = training::cancel_training_job(&client, 8).await.unwrap();
        assert_eq!(env.data, None);
    }

    #[tokio::test]
    async fn test_start_training_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/training/jobs/4/start"))
            .and(body_json(json!({
                "totalEpochs": 10,
                "modelName": "watercolor",
                "trainingImageUrls": ["https://cdn/1.png", "https://cdn/2.png"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({"jobId": 4}))))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::with_tokens("a", "r"));
        let request = StartTrainingRequest {
            total_epochs: 10,
            model_name: "watercolor".to_string(),
            training_image_urls: vec!["https://cdn/1.png".into(), "https://cdn/2.png".into()],
            callback_base_url: None,
        };
        let env = training::start_training(&client, 4, &request).await.unwrap();
        assert_eq!(env.data["jobId"], 4);
    }

    #[tokio::test]
    async fn test_generate_image_omits_unset_options() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_json(json!({"modelId": 2, "prompt": "a fox", "numImages": 2, "seed": 42})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({"status": "QUEUED"}))))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::with_tokens("a", "r"));
        let request = GenerateRequest {
            model_id: 2,
            prompt: "a fox".to_string(),
            num_images: Some(2),
            seed: Some(42),
            ..Default::default()
        };
        let env = generation::generate_image(&client, &request).await.unwrap();
        assert_eq!(env.data["status"], "QUEUED");
    }

    // ── Session lifecycle ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_refresh_session_stores_new_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .and(body_json(json!({"refreshToken": "refresh-old"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "accessToken": "access-new",
                "refreshToken": "refresh-new"
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let store = MemorySessionStore::with_tokens("access-old", "refresh-old");
        let client = client_with(&server, &store);
        assert!(auth::refresh_session(&client).await.unwrap());

        assert_eq!(store.access_token().as_deref(), Some("access-new"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-new"));

        // The exchange itself never carries the (possibly expired) bearer token
        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_refresh_session_without_token_is_noop() {
        let server = MockServer::start().await;
        let client = client_with(&server, &MemorySessionStore::new());
        assert!(!auth::refresh_session(&client).await.unwrap());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logout_session_clears_tokens_even_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = MemorySessionStore::with_tokens("a", "r");
        let client = client_with(&server, &store);
        let err = auth::logout_session(&client).await.unwrap_err();

        assert_eq!(err.message(), "HTTP Error: 500");
        assert!(!store.is_authenticated());
        assert_eq!(store.refresh_token(), None);
    }

    #[test]
    fn test_complete_login_stores_callback_tokens() {
        let store = MemorySessionStore::new();
        auth::complete_login(
            &store,
            "http://localhost:5173/auth/callback?accessToken=at-1&refreshToken=rt-1",
        )
        .unwrap();
        assert_eq!(store.access_token().as_deref(), Some("at-1"));
        assert_eq!(store.refresh_token().as_deref(), Some("rt-1"));

        let err = auth::complete_login(&store, "http://localhost:5173/auth/callback?accessToken=x")
            .unwrap_err();
        assert!(matches!(err, auth::CallbackError::MissingToken("refreshToken")));
    }

    #[test]
    fn test_login_url() {
        let client = ApiClient::new("http://backend.test/", Arc::new(MemorySessionStore::new()));
        assert_eq!(
            auth::login_url(&client),
            "http://backend.test/api/auth/google?prompt=select_account"
        );
    }

    // ── Upload ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_presigned_urls_match_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/training/upload-urls"))
            .and(body_json(json!({"fileNames": ["first.png", "second.png"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "uploadUrls": ["https://s3/up/first", "https://s3/up/second"],
                "downloadUrls": ["https://s3/down/first", "https://s3/down/second"]
            }))))
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::with_tokens("a", "r"));
        let targets = upload::get_presigned_urls(&client, &["first.png", "second.png"])
            .await
            .unwrap()
            .data
            .targets()
            .unwrap();

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].upload_url, "https://s3/up/first");
        assert_eq!(targets[0].download_url, "https://s3/down/first");
        assert_eq!(targets[1].upload_url, "https://s3/up/second");
        assert_eq!(targets[1].download_url, "https://s3/down/second");
    }

    #[tokio::test]
    async fn test_upload_files_puts_without_bearer() {
        let server = MockServer::start().await;
        let base = server.uri();
        Mock::given(method("POST"))
            .and(path("/api/training/upload-urls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "uploadUrls": [format!("{}/bucket/a?sig=1", base), format!("{}/bucket/b?sig=2", base)],
                "downloadUrls": ["https://cdn/a", "https://cdn/b"]
            }))))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/bucket/a"))
            .and(header("content-type", "image/png"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/bucket/b"))
            .and(header("content-type", "application/octet-stream"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::with_tokens("a", "r"));
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let files = vec![UploadFile::new("a.png", png), UploadFile::new("b", vec![7; 8])];
        let urls = upload::upload_files(&client, files).await.unwrap();
        assert_eq!(urls, vec!["https://cdn/a", "https://cdn/b"]);

        let requests = server.received_requests().await.unwrap();
        let puts: Vec<_> = requests
            .iter()
            .filter(|r| r.method.as_str() == "PUT")
            .collect();
        assert_eq!(puts.len(), 2);
        assert!(puts.iter().all(|r| r.headers.get("authorization").is_none()));
    }

    #[tokio::test]
    async fn test_rejected_transfer_is_upload_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/bucket/expired"))
            .respond_with(ResponseTemplate::new(403).set_body_string("<Error>Expired</Error>"))
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::new());
        let url = format!("{}/bucket/expired", server.uri());
        let err = upload::upload_to_storage(&client, &url, vec![1, 2, 3], "image/png")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upload);
        assert_eq!(err.message(), "Failed to upload file to storage");
        assert_eq!(err.status(), Some(403));
    }

    // ── Routes ───────────────────────────────────────────────────────────

    fn prompt_json() -> Value {
        json!({
            "id": 7, "modelId": 5, "title": "Portrait", "prompt": "1girl, smile",
            "negativePrompt": "lowres", "description": "", "displayOrder": 0,
            "createdAt": "2025-03-01T12:00:00"
        })
    }

    fn user_json() -> Value {
        json!({
            "id": 2, "email": "mina@example.com", "name": "Mina", "nickname": "mina",
            "profileImageUrl": "https://cdn/p.png", "role": "USER",
            "createdAt": "2025-03-01T12:00:00"
        })
    }

    fn comment_page() -> Value {
        json!({
            "content": [{
                "id": 12, "modelId": 5, "userId": 1, "userNickname": "mina",
                "userProfileImageUrl": "", "content": "nice", "likeCount": 2,
                "isLiked": false, "createdAt": "c"
            }],
            "totalElements": 1, "totalPages": 1, "size": 20, "number": 0
        })
    }

    fn job_json(id: i64) -> Value {
        json!({
            "id": id, "modelId": 5, "userId": 1, "status": "PENDING",
            "currentEpoch": 0, "totalEpochs": 10, "phase": "QUEUED",
            "createdAt": "2025-03-01T12:00:00"
        })
    }

    /// Mount exactly one `verb route` reply carrying `data`, run `call`
    /// against it with a stored token, and check the decoded data.
    async fn assert_route<T, F, Fut>(verb: &str, route: &str, data: Value, call: F)
    where
        T: Serialize,
        F: FnOnce(ApiClient) -> Fut,
        Fut: Future<Output = Result<Envelope<T>, ApiError>>,
    {
        let server = MockServer::start().await;
        Mock::given(method(verb))
            .and(path(route))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(data.clone())))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(&server, &MemorySessionStore::with_tokens("access-1", "refresh-1"));
        let env = call(client)
            .await
            .unwrap_or_else(|e| panic!("{} {} failed: {}", verb, route, e));
        assert_eq!(serde_json::to_value(&env.data).unwrap(), data, "{} {}", verb, route);
        server.verify().await;
    }

    #[tokio::test]
    async fn test_model_routes() {
        let page = model_page(3, 0, 20);
        assert_route("GET", "/api/models/popular", page.clone(), |c| async move {
            models::get_popular_models(&c, PageRequest::default()).await
        })
        .await;
        assert_route("GET", "/api/models/my", page.clone(), |c| async move {
            models::get_my_models(&c, PageRequest::default()).await
        })
        .await;
        assert_route("GET", "/api/models/search", page, |c| async move {
            models::search_models(&c, "fox", PageRequest::default()).await
        })
        .await;
        assert_route("POST", "/api/models", model_json(5), |c| async move {
            let request = CreateModelRequest {
                title: "Model 5".into(),
                ..Default::default()
            };
            models::create_model(&c, &request).await
        })
        .await;
        assert_route("PUT", "/api/models/5", model_json(5), |c| async move {
            let request = UpdateModelRequest {
                is_public: Some(false),
                ..Default::default()
            };
            models::update_model(&c, 5, &request).await
        })
        .await;
        assert_route("DELETE", "/api/models/5", Value::Null, |c| async move {
            models::delete_model(&c, 5).await
        })
        .await;
    }

    #[tokio::test]
    async fn test_prompt_routes() {
        assert_route("POST", "/api/models/5/prompts", prompt_json(), |c| async move {
            let request = CreatePromptRequest {
                title: "Portrait".into(),
                prompt: "1girl, smile".into(),
                negative_prompt: "lowres".into(),
                description: None,
            };
            models::create_prompt(&c, 5, &request).await
        })
        .await;
        assert_route("PUT", "/api/models/5/prompts/7", prompt_json(), |c| async move {
            let request = UpdatePromptRequest {
                title: Some("Portrait".into()),
                ..Default::default()
            };
            models::update_prompt(&c, 5, 7, &request).await
        })
        .await;
        assert_route("DELETE", "/api/models/5/prompts/7", Value::Null, |c| async move {
            models::delete_prompt(&c, 5, 7).await
        })
        .await;
    }

    #[tokio::test]
    async fn test_community_routes() {
        assert_route("POST", "/api/models/5/favorite", json!({"favorited": true}), |c| async move {
            community::toggle_favorite(&c, 5).await
        })
        .await;
        assert_route(
            "POST",
            "/api/models/5/comments/12/like",
            json!({"isLiked": true}),
            |c| async move { community::toggle_comment_like(&c, 5, 12).await },
        )
        .await;
        assert_route("GET", "/api/models/5/comments", comment_page(), |c| async move {
            community::get_comments(&c, 5, PageRequest::default()).await
        })
        .await;
        assert_route("DELETE", "/api/models/5/comments/12", Value::Null, |c| async move {
            community::delete_comment(&c, 5, 12).await
        })
        .await;
        assert_route("GET", "/api/models/favorites", model_page(2, 0, 20), |c| async move {
            community::get_favorite_models(&c, PageRequest::default()).await
        })
        .await;
        assert_route("GET", "/api/models/likes", model_page(2, 0, 20), |c| async move {
            community::get_liked_models(&c, PageRequest::default()).await
        })
        .await;
    }

    #[tokio::test]
    async fn test_tag_routes() {
        let found = json!([{"id": 1, "name": "anime", "category": "style", "usageCount": 12}]);
        assert_route("GET", "/api/tags/search", found, |c| async move {
            tags::search_tags(&c, "ani").await
        })
        .await;
        assert_route("POST", "/api/tags/models/5", Value::Null, |c| async move {
            tags::add_tag_to_model(&c, 5, "anime", Some("style")).await
        })
        .await;
        assert_route("DELETE", "/api/tags/models/5/tags/1", Value::Null, |c| async move {
            tags::remove_tag_from_model(&c, 5, 1).await
        })
        .await;
    }

    #[tokio::test]
    async fn test_user_and_search_routes() {
        assert_route("PUT", "/api/users/me", user_json(), |c| async move {
            let request = UpdateProfileRequest {
                nickname: Some("mina".into()),
                ..Default::default()
            };
            user::update_my_profile(&c, &request).await
        })
        .await;
        assert_route("GET", "/api/users/2", user_json(), |c| async move {
            user::get_user_profile(&c, 2).await
        })
        .await;
        assert_route("GET", "/api/search/models", model_page(1, 0, 20), |c| async move {
            search::search_models(&c, "fox", PageRequest::default()).await
        })
        .await;

        let mut search_user = user_json();
        search_user["modelsCount"] = json!(4);
        let users = json!({
            "content": [search_user],
            "totalElements": 1, "totalPages": 1, "size": 20, "number": 0
        });
        assert_route("GET", "/api/search/users", users, |c| async move {
            search::search_users(&c, "mina", PageRequest::default()).await
        })
        .await;
    }

    #[tokio::test]
    async fn test_training_and_generation_routes() {
        assert_route("POST", "/api/models", model_json(5), |c| async move {
            let request = TrainingModelRequest {
                title: "Model 5".into(),
                epochs: Some(10),
                ..Default::default()
            };
            training::create_model(&c, &request).await
        })
        .await;
        assert_route("POST", "/api/training/models/5", job_json(8), |c| async move {
            training::create_training_job(&c, 5).await
        })
        .await;
        assert_route("GET", "/api/training/jobs/8", job_json(8), |c| async move {
            training::get_training_job(&c, 8).await
        })
        .await;
        assert_route("GET", "/api/training/my", json!([job_json(8), job_json(9)]), |c| async move {
            training::get_my_training_jobs(&c).await
        })
        .await;

        let history = json!({
            "content": [{"id": 3, "prompt": "a fox", "imageUrls": ["https://cdn/1.png"]}],
            "totalElements": 1, "totalPages": 1, "size": 20, "number": 0
        });
        assert_route("GET", "/api/generate/history/my", history, |c| async move {
            generation::get_my_generation_history(&c, PageRequest::default()).await
        })
        .await;
    }

    #[tokio::test]
    async fn test_logout_carries_bearer_and_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .and(header("authorization", "Bearer access-1"))
            .and(body_json(json!({"refreshToken": "refresh-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(Value::Null)))
            .expect(1)
            .mount(&server)
            .await;

        let store = MemorySessionStore::with_tokens("access-1", "refresh-1");
        let client = client_with(&server, &store);
        let env = auth::logout(&client, "refresh-1").await.unwrap();
        assert_eq!(env.data, None);
        // The bare command leaves local tokens alone
        assert!(store.is_authenticated());
    }
}
