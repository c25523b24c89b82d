//! Embedded log viewer.

/// Served at `/`.  Polls `/logs` once a second and keeps the view pinned
/// to the bottom only when the reader was already there.
pub const INDEX_HTML: &str = r#"<!doctype html><html><head><meta charset="utf-8">
<title>Door Lock Logs</title>
<style>
  body{font-family:ui-monospace,monospace;margin:0;background:#111;color:#eee}
  header{padding:10px 14px;background:#222;position:sticky;top:0}
  pre{white-space:pre-wrap;word-wrap:break-word;padding:14px;margin:0}
  small{opacity:.7}
</style></head><body>
<header>Front Door Monitor <small>(auto updates bing bong)</small></header>
<pre id="out">Loading…</pre>
<script>
async function pull(){
  try{
    const r = await fetch('/logs', {cache:'no-store'});
    const t = await r.text();
    const el = document.getElementById('out');
    const atBottom = (window.innerHeight + window.scrollY) >= (document.body.offsetHeight - 4);
    el.textContent = t;
    if(atBottom) window.scrollTo(0, document.body.scrollHeight);
  }catch(e){}
}
pull(); setInterval(pull, 1000);
</script></body></html>
"#;
