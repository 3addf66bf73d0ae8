use actix_web::{App, HttpResponse, HttpServer, web};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn html(body: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

const HOME: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Home</title>
    <meta name="description" content="The front page.">
</head>
<body>
    <nav>
        <a href="/about">About</a>
        <a href="/blog/post-1#comments">Post</a>
        <a href="/blog/post-1">Post again</a>
        <a href="/missing">Missing</a>
        <a href="/data.json">Data</a>
        <a href="/cycle-a">Cycle</a>
        <a href="mailto:hello@example.com">Mail</a>
        <a href="http://127.0.0.1:1/unreachable">Unreachable</a>
    </nav>
    <main>
        <h1>Welcome</h1>
        <p>Short intro.</p>
        <img src="/img/ok.png" alt="Logo">
        <img src="/img/missing.png">
    </main>
</body>
</html>"#;

const ABOUT: &str = r#"<!DOCTYPE html>
<html>
<head><title>About</title></head>
<body>
    <main>
        <h1>About</h1>
        <p>We write things.</p>
        <a href="/">Home</a>
        <a href="/redirect">Moved</a>
    </main>
</body>
</html>"#;

const POST: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Growing tomatoes in a small garden, a practical guide</title>
    <meta name="description" content="How we grow tomatoes every summer in a small garden, from seed to harvest, with notes on soil, water, light and the varieties that worked best.">
    <link rel="canonical" href="/blog/post-1">
    <meta property="og:title" content="Growing tomatoes">
    <meta property="og:description" content="Tomatoes from seed to harvest">
    <meta property="og:image" content="/img/ok.png">
    <meta name="twitter:card" content="summary">
    <meta property="article:published_time" content="2024-05-01T09:00:00+00:00">
    <script type="application/ld+json">{"@type": "BlogPosting"}</script>
</head>
<body>
    <article>
        <h1>Growing tomatoes</h1>
        <div class="featured-image"><img src="/img/ok.png" alt="Tomatoes"></div>
        <h2>Soil</h2>
        <p>Our garden grows tomatoes every summer.</p>
        <h2>Water</h2>
        <p>Water them in the morning.</p>
        <ul><li>Cherry</li><li>Roma</li></ul>
        <a href="/">Home</a>
        <a href="/about">About</a>
    </article>
</body>
</html>"#;

const CYCLE_A: &str = r#"<html><head><title>A</title></head>
<body><main><p>A</p><a href="/cycle-b">B</a><a href="/cycle-a">self</a></main></body></html>"#;

const CYCLE_B: &str = r#"<html><head><title>A</title></head>
<body><main><p>B</p><a href="/cycle-a">A</a></main></body></html>"#;

/// Starts a small site on an ephemeral port and returns its base URL.
///
/// Layout: `/` links to `/about`, `/blog/post-1` (twice, once with a
/// fragment), `/missing` (404), `/data.json` (non-HTML) and a two-page cycle
/// whose pages share a title. `/head-fails` answers 500 to HEAD and 200 to
/// GET.
#[allow(dead_code)]
pub async fn start_site_server() -> String {
    let http_server = HttpServer::new(|| {
        App::new()
            .route("/", web::get().to(|| async { html(HOME) }))
            .route("/about", web::get().to(|| async { html(ABOUT) }))
            .route("/blog/post-1", web::get().to(|| async { html(POST) }))
            .route("/cycle-a", web::get().to(|| async { html(CYCLE_A) }))
            .route("/cycle-b", web::get().to(|| async { html(CYCLE_B) }))
            .route(
                "/missing",
                web::get().to(|| async { HttpResponse::NotFound().body("Not Found") }),
            )
            .route(
                "/data.json",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("application/json")
                        .body(r#"{"ok": true}"#)
                }),
            )
            .route(
                "/redirect",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/about"))
                        .finish()
                }),
            )
            .service(
                web::resource("/head-fails")
                    .route(
                        web::head().to(|| async { HttpResponse::InternalServerError().finish() }),
                    )
                    .route(web::get().to(|| async { HttpResponse::Ok().body("fine") })),
            )
            .route(
                "/img/ok.png",
                web::get().to(|| async {
                    HttpResponse::Ok().content_type("image/png").body(PNG_BYTES)
                }),
            )
            .route(
                "/robots.txt",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/plain")
                        .body("User-agent: *\nDisallow: /private\nSitemap: /sitemap.xml\n")
                }),
            )
            .route(
                "/sitemap.xml",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("application/xml")
                        .body(r#"<?xml version="1.0"?><urlset></urlset>"#)
                }),
            )
    })
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind test server");

    let addr = http_server
        .addrs()
        .first()
        .cloned()
        .expect("No address bound");
    let url = format!("http://{}", addr);

    let app_server = http_server.run();

    tokio::spawn(async move {
        if let Err(e) = app_server.await {
            eprintln!("Test server error: {}", e);
        }
    });

    url
}

/// A server with no robots.txt and no sitemap, serving only a bare page.
#[allow(dead_code)]
pub async fn start_bare_server() -> String {
    let http_server = HttpServer::new(|| {
        App::new().route(
            "/",
            web::get().to(|| async { html("<html><body><p>bare</p></body></html>") }),
        )
    })
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind test server");

    let addr = http_server
        .addrs()
        .first()
        .cloned()
        .expect("No address bound");
    let url = format!("http://{}", addr);

    let app_server = http_server.run();

    tokio::spawn(async move {
        if let Err(e) = app_server.await {
            eprintln!("Test server error: {}", e);
        }
    });

    url
}
