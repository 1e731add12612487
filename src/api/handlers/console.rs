use axum::response::Html;

/// Page shell for the console. The client script bootstraps itself from
/// `/api/auth/session` and talks to the `/api` routes with the bearer token
/// it gets back.
pub async fn console() -> Html<&'static str> {
    Html(CONSOLE_PAGE)
}

const CONSOLE_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Assistant Console</title>
  <link rel="stylesheet" href="/assets/console.css">
</head>
<body>
  <header>
    <h1>Assistant Console</h1>
    <nav>
      <a href="/auth/sign-out">Sign out</a>
    </nav>
  </header>
  <main id="app" data-session-url="/api/auth/session">
    <noscript>This console requires JavaScript.</noscript>
  </main>
  <script src="/assets/console.js" defer></script>
</body>
</html>
"#;
