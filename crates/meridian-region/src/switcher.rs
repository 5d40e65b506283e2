//! Region switch fragment injected into every regional page.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::region::Region;

#[derive(Debug, Serialize)]
struct SwitchTarget {
    slug: &'static str,
    label: &'static str,
}

/// Render the switcher script for a page built for `current`.
///
/// The script links to the same page under every other region in `built`.
/// Returns an empty string when there is no other region to switch to.
pub fn switcher_fragment(current: Region, built: &[Region]) -> Result<String, minijinja::Error> {
    let targets: Vec<SwitchTarget> = built
        .iter()
        .filter(|r| **r != current)
        .map(|r| SwitchTarget {
            slug: r.slug(),
            label: r.label(),
        })
        .collect();

    if targets.is_empty() {
        return Ok(String::new());
    }

    let slugs = built
        .iter()
        .map(|r| r.slug())
        .collect::<Vec<_>>()
        .join("|");

    let mut env = Environment::new();
    env.add_template("switcher", SWITCHER_TEMPLATE)?;
    env.get_template("switcher")?.render(context! {
        slugs => slugs,
        targets => targets,
    })
}

/// Insert `fragment` before the first `</body>`.
///
/// Pages without a closing body tag, and empty fragments, leave the page as is.
pub fn inject_switcher(html: &str, fragment: &str) -> String {
    if fragment.is_empty() || !html.contains("</body>") {
        return html.to_string();
    }

    html.replacen("</body>", &format!("{fragment}\n    </body>"), 1)
}

const SWITCHER_TEMPLATE: &str = r#"
        <script>
        (function(){
            var path=(location.pathname.replace(/^\/({{ slugs }})\/?/,'')||'index.html').replace(/^\//,'');
            var el=document.querySelector('.menu-list');
            if(!el)return;
            [{% for t in targets %}{slug:'{{ t.slug }}',label:'{{ t.label }}'}{% if not loop.last %},{% endif %}{% endfor %}].forEach(function(t){
                var li=document.createElement('li');
                li.className='m-0 p-0 ms-lg-3';
                li.innerHTML='<a class="menu-link link" href="/'+t.slug+'/'+path+'">'+t.label+'</a>';
                el.appendChild(li);
            });
        })();
        </script>"#;
