use maud::{DOCTYPE, Markup, PreEscaped, html};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

// Renders `/read` results into #results; images come from the upload mount.
const SEARCH_SCRIPT: &str = r#"
const form = document.getElementById('search');
const results = document.getElementById('results');
form.addEventListener('submit', async (event) => {
  event.preventDefault();
  const params = new URLSearchParams(new FormData(form));
  for (const [key, value] of [...params]) { if (!value) params.delete(key); }
  const resp = await fetch('/read?' + params.toString());
  const body = await resp.json();
  results.replaceChildren();
  if (!resp.ok) {
    const p = document.createElement('p');
    p.className = 'text-gray-600';
    p.textContent = body.message;
    results.append(p);
    return;
  }
  for (const movie of body) {
    const card = document.createElement('div');
    card.className = 'bg-white shadow rounded-lg p-4 flex gap-4';
    if (movie.imagePath) {
      const img = document.createElement('img');
      img.src = '/images/' + encodeURIComponent(movie.imagePath);
      img.className = 'w-20 h-28 object-cover rounded';
      card.append(img);
    }
    const text = document.createElement('div');
    text.innerHTML = '<p class="font-semibold"></p><p class="text-sm text-gray-500"></p>';
    text.children[0].textContent = `${movie.id} · ${movie.title} (${movie.releaseYear})`;
    text.children[1].textContent = `${movie.genre} · ${movie.durationMinutes} min · ★ ${movie.rating}`;
    card.append(text);
    results.append(card);
  }
});
"#;

pub fn index_page() -> String {
    page(
        "Movies",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-3xl mx-auto px-6 py-12" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-3xl font-bold text-gray-900" { "Movies" }
                        p class="mt-2 text-gray-600" { "Search the catalogue by title, id or rating." }

                        form id="search" class="mt-8 grid gap-4 md:grid-cols-2" {
                            (text_input("title", "Title", "text"))
                            (text_input("id", "Id", "text"))
                            (text_input("ratingFr", "Rating from", "number"))
                            (text_input("ratingTo", "Rating to", "number"))
                            button class="md:col-span-2 rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Search" }
                        }
                    }

                    div id="results" class="mt-8 space-y-4" {}
                }
            }
            script { (PreEscaped(SEARCH_SCRIPT)) }
        },
    )
}

fn text_input(name: &str, label: &str, kind: &str) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(name) { (label) }
            input class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500" type=(kind) step=[(kind == "number").then_some("0.1")] name=(name) id=(name);
        }
    }
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="vi" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_page_has_search_form() {
        let html = index_page();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"id="search""#));
        assert!(html.contains(r#"name="ratingFr""#));
        assert!(html.contains("/read?"));
    }
}
