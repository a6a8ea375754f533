const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>今日の献立</title>
<style>
  body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; padding: 0 1rem; }
  #dish-image { max-width: 100%; display: none; }
  button { font-size: 1.2rem; padding: 0.5rem 1.5rem; }
</style>
</head>
<body>
<h1 id="dish-name">{{message}}</h1>
<button id="generate">献立をゲット</button>
<img id="dish-image" alt="">
<p id="dish-description"></p>
<p id="dish-material"></p>
<p><a id="dish-url" target="_blank" rel="noopener"></a></p>
<script>
document.getElementById("generate").addEventListener("click", async () => {
  const res = await fetch("/api/generateDish", { method: "POST" });
  const dish = await res.json();
  document.getElementById("dish-name").textContent = dish.dishName;
  const image = document.getElementById("dish-image");
  image.src = dish.dishImageUrl;
  image.style.display = dish.dishImageUrl ? "block" : "none";
  document.getElementById("dish-description").textContent = dish.recipeDescription;
  document.getElementById("dish-material").textContent = dish.recipeMaterial;
  const link = document.getElementById("dish-url");
  link.href = dish.recipeUrl;
  link.textContent = dish.recipeUrl ? "レシピを見る" : "";
});
</script>
</body>
</html>
"#;

/// Render the single page with `message` as the headline.
pub(super) fn render(message: &str) -> String {
    TEMPLATE.replace("{{message}}", &html_escape::encode_text(message))
}
