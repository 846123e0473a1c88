//! CLI Command Tests
//!
//! Argument parsing, JSON output format and exit codes, with the catalog
//! backed by a mock server.

// =============================================================================
// CLI Argument Parsing Tests
// =============================================================================

mod cli_parsing {
    use clap::Parser;
    use marquee::cli::{Cli, Command, ExitCode, MediaTypeFilter};

    #[test]
    fn test_list_commands() {
        for (args, expected) in [
            (["marquee", "trending"], "trending"),
            (["marquee", "movies"], "movies"),
            (["marquee", "shows"], "shows"),
            (["marquee", "top-rated"], "top-rated"),
        ] {
            let cli = Cli::parse_from(args);
            let name = match cli.command {
                Command::Trending(_) => "trending",
                Command::Movies(_) => "movies",
                Command::Shows(_) => "shows",
                Command::TopRated(_) => "top-rated",
                _ => "other",
            };
            assert_eq!(name, expected);
        }
    }

    #[test]
    fn test_search_with_filters() {
        let cli = Cli::parse_from([
            "marquee",
            "search",
            "star wars",
            "--limit",
            "5",
            "--type",
            "movie",
            "--year-from",
            "1977",
            "--year-to",
            "1983",
        ]);
        match cli.command {
            Command::Search(cmd) => {
                assert_eq!(cmd.query, "star wars");
                assert_eq!(cmd.limit, Some(5));
                assert_eq!(cmd.media_type, Some(MediaTypeFilter::Movie));
                assert_eq!(cmd.year_from, Some(1977));
                assert_eq!(cmd.year_to, Some(1983));
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_detail_commands() {
        match Cli::parse_from(["marquee", "movie", "27205"]).command {
            Command::Movie(cmd) => assert_eq!(cmd.id, 27205),
            _ => panic!("Expected Movie command"),
        }
        match Cli::parse_from(["marquee", "show", "1396"]).command {
            Command::Show(cmd) => assert_eq!(cmd.id, 1396),
            _ => panic!("Expected Show command"),
        }
        match Cli::parse_from(["marquee", "genres", "tv"]).command {
            Command::Genres(cmd) => assert_eq!(cmd.kind, MediaTypeFilter::Tv),
            _ => panic!("Expected Genres command"),
        }
    }

    #[test]
    fn test_non_numeric_id_rejected() {
        assert!(Cli::try_parse_from(["marquee", "movie", "tt1375666"]).is_err());
        assert!(Cli::try_parse_from(["marquee", "episode", "1396", "1"]).is_err());
    }

    #[test]
    fn test_xref_command() {
        let cli = Cli::parse_from([
            "marquee", "xref", "--title", "Heat", "--year", "1995", "--type", "movie",
        ]);
        match cli.command {
            Command::Xref(cmd) => {
                assert!(cmd.id.is_none());
                assert_eq!(cmd.title.as_deref(), Some("Heat"));
                assert_eq!(cmd.year, Some(1995));
                assert!(!cmd.verify);
            }
            _ => panic!("Expected Xref command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "marquee",
            "--json",
            "--quiet",
            "--config",
            "/tmp/marquee.toml",
            "trending",
        ]);
        assert!(cli.json);
        assert!(cli.quiet);
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("/tmp/marquee.toml"))
        );
    }

    #[test]
    fn test_command_aliases() {
        assert!(matches!(
            Cli::parse_from(["marquee", "tr"]).command,
            Command::Trending(_)
        ));
        assert!(matches!(
            Cli::parse_from(["marquee", "s", "dune"]).command,
            Command::Search(_)
        ));
        assert!(matches!(
            Cli::parse_from(["marquee", "p", "dune"]).command,
            Command::Preview(_)
        ));
        assert!(matches!(
            Cli::parse_from(["marquee", "top"]).command,
            Command::TopRated(_)
        ));
        assert!(matches!(
            Cli::parse_from(["marquee", "ep", "1", "1", "1"]).command,
            Command::Episode(_)
        ));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::NotFound), 4);
        assert_eq!(i32::from(ExitCode::ConfigError), 5);
    }
}

// =============================================================================
// JSON Output Tests
// =============================================================================

mod json_output {
    use marquee::cli::{ExitCode, JsonOutput, XrefResponse};

    #[test]
    fn test_json_output_success() {
        let output = JsonOutput::success(vec!["a", "b"]);
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"data\""));
        assert!(!json.contains("\"error\""));
        assert!(!json.contains("exit_code"));
    }

    #[test]
    fn test_json_output_error() {
        let output = JsonOutput::failure("Network down", ExitCode::NetworkError);
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"error\":\"Network down\""));
        assert!(json.contains("\"exit_code\":3"));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn test_xref_response_format() {
        let response = XrefResponse {
            xref_id: Some("tt0113277".into()),
            verified: true,
            title: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "xref_id": "tt0113277", "verified": true })
        );
    }
}

// =============================================================================
// Command Handler Tests
// =============================================================================

mod command_handlers {
    use mockito::{Matcher, Server, ServerGuard};

    use marquee::api::{OmdbClient, TmdbClient};
    use marquee::catalog::Catalog;
    use marquee::cli::{
        ExitCode, ListCmd, MediaTypeFilter, MovieCmd, Output, SearchCmd, TrendingCmd, XrefCmd,
    };
    use marquee::commands;
    use marquee::xref::XrefResolver;

    fn output() -> Output {
        Output {
            json: true,
            quiet: true,
        }
    }

    fn catalog(server: &ServerGuard, key: &str) -> Catalog {
        Catalog::new(
            TmdbClient::with_base_url(key, server.url()),
            XrefResolver::new(OmdbClient::with_base_url("omdb_key", server.url())),
        )
    }

    fn xref_cmd(id: Option<&str>, title: Option<&str>, verify: bool) -> XrefCmd {
        XrefCmd {
            id: id.map(String::from),
            title: title.map(String::from),
            year: None,
            kind: MediaTypeFilter::Movie,
            verify,
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let server = Server::new_async().await;
        let code = commands::trending_cmd(
            TrendingCmd {
                limit: None,
                media_type: None,
            },
            &catalog(&server, ""),
            &output(),
        )
        .await;
        assert_eq!(code, ExitCode::ConfigError);
    }

    #[tokio::test]
    async fn test_not_found_exit_code() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/movie/42")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let code =
            commands::movie_cmd(MovieCmd { id: 42 }, &catalog(&server, "k"), &output()).await;
        assert_eq!(code, ExitCode::NotFound);
    }

    #[tokio::test]
    async fn test_server_error_is_network_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/movie/top_rated")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let code = commands::top_rated_cmd(
            ListCmd { limit: Some(3) },
            &catalog(&server, "k"),
            &output(),
        )
        .await;
        assert_eq!(code, ExitCode::NetworkError);
    }

    #[tokio::test]
    async fn test_empty_search_is_invalid() {
        let server = Server::new_async().await;
        let code = commands::search_cmd(
            SearchCmd {
                query: "  ".into(),
                limit: None,
                media_type: None,
                year_from: None,
                year_to: None,
            },
            &catalog(&server, "k"),
            &output(),
        )
        .await;
        assert_eq!(code, ExitCode::InvalidArgs);
    }

    #[tokio::test]
    async fn test_xref_arguments() {
        let server = Server::new_async().await;
        let catalog = catalog(&server, "k");

        let code = commands::xref_cmd(xref_cmd(None, None, false), &catalog, &output()).await;
        assert_eq!(code, ExitCode::InvalidArgs);

        let code =
            commands::xref_cmd(xref_cmd(Some("bogus"), None, false), &catalog, &output()).await;
        assert_eq!(code, ExitCode::InvalidArgs);

        // Shape check only, no request
        let code =
            commands::xref_cmd(xref_cmd(Some("TT0113277"), None, false), &catalog, &output())
                .await;
        assert_eq!(code, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_xref_title_not_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("t".into(), "Nothing Here".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"Response":"False","Error":"Movie not found!"}"#)
            .create_async()
            .await;

        let code = commands::xref_cmd(
            xref_cmd(None, Some("Nothing Here"), false),
            &catalog(&server, "k"),
            &output(),
        )
        .await;

        mock.assert_async().await;
        assert_eq!(code, ExitCode::NotFound);
    }

    #[tokio::test]
    async fn test_verify_without_omdb_key() {
        let server = Server::new_async().await;
        let catalog = Catalog::new(
            TmdbClient::with_base_url("k", server.url()),
            XrefResolver::disabled(),
        );

        let code =
            commands::xref_cmd(xref_cmd(Some("tt0113277"), None, true), &catalog, &output())
                .await;
        assert_eq!(code, ExitCode::ConfigError);
    }
}
