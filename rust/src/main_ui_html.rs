use crate::render_surface::TAILWIND_CDN;

pub fn build_main_ui_html() -> String {
    MAIN_UI_HTML.replace("{{TAILWIND_CDN}}", TAILWIND_CDN)
}

// Generated markup is assigned through innerHTML as-is. Nothing here sanitizes it.
const MAIN_UI_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>AI PageCraft</title>
  <script>
    window.tailwind = window.tailwind || {};
    window.tailwind.config = { darkMode: "class" };
  </script>
  <script src="{{TAILWIND_CDN}}"></script>
  <style>
    .spinner {
      width: 18px;
      height: 18px;
      border: 2px solid rgba(255, 255, 255, 0.4);
      border-top-color: #ffffff;
      border-radius: 50%;
      animation: spin 0.8s linear infinite;
    }
    @keyframes spin {
      to { transform: rotate(360deg); }
    }
    button:disabled {
      opacity: 0.6;
      cursor: not-allowed;
    }
  </style>
</head>
<body>
  <div class="min-h-screen flex flex-col bg-gradient-to-br from-purple-100 via-white to-indigo-100 dark:from-gray-900 dark:to-black text-gray-800 dark:text-gray-100 transition-all duration-500">
    <header class="p-4 shadow-sm bg-white/70 dark:bg-white/5 backdrop-blur-lg border-b border-white/10">
      <div class="max-w-6xl mx-auto flex items-center justify-between">
        <div class="flex items-center gap-2 text-2xl font-bold text-purple-700 dark:text-purple-400">
          <span aria-hidden="true">✦</span>
          <span>AI PageCraft</span>
        </div>
        <button id="themeToggle" class="text-sm text-gray-500 dark:text-gray-400 border px-3 py-1 rounded-lg hover:bg-gray-100 dark:hover:bg-gray-800 transition">
          Toggle Theme
        </button>
      </div>
    </header>

    <main class="flex-1 flex items-center justify-center px-6 py-12">
      <div class="w-full max-w-3xl bg-white/80 dark:bg-white/10 backdrop-blur-xl border border-white/30 rounded-3xl shadow-2xl p-8">
        <h1 class="text-3xl font-extrabold text-center mb-4 text-purple-700 dark:text-purple-400">
          Generate Stunning Landing Pages in Seconds
        </h1>
        <p class="text-center text-gray-500 dark:text-gray-400 mb-8">
          Just type your product idea and AI will create a beautiful, ready-to-use HTML landing page.
        </p>

        <div class="space-y-4">
          <input id="idea" type="text"
            placeholder="Enter your Product idea (e.g. AI Resume Builder)"
            class="w-full border border-gray-300 dark:border-gray-700 rounded-lg px-4 py-3 focus:ring-2 focus:ring-purple-400 focus:outline-none bg-white dark:bg-gray-900 shadow-sm" />
          <select id="category"
            class="w-full border border-gray-300 dark:border-gray-700 rounded-lg px-4 py-3 focus:ring-2 focus:ring-purple-400 bg-white dark:bg-gray-900 shadow-sm"></select>
          <button id="generate"
            class="w-full bg-gradient-to-r from-purple-600 to-indigo-600 text-white py-3 rounded-xl font-semibold shadow-lg hover:opacity-90 transition-all">
            Generate Landing Page
          </button>
        </div>

        <p id="error" class="text-red-500 font-medium mt-4 text-center hidden" role="alert"></p>

        <div id="result" class="mt-8 bg-gray-50 dark:bg-gray-800/40 border border-gray-200 dark:border-gray-700 rounded-2xl p-6 shadow-inner hidden">
          <div class="flex justify-between items-center mb-3">
            <h2 class="text-lg font-semibold">Generated HTML Preview</h2>
            <div class="flex gap-2">
              <button id="copy" class="flex items-center gap-2 bg-purple-600 text-white px-3 py-2 rounded-lg hover:bg-purple-700 transition-all">Copy HTML</button>
              <button id="viewFull" class="flex items-center gap-2 bg-indigo-600 text-white px-3 py-2 rounded-lg hover:bg-indigo-700 transition-all">View Full</button>
              <a href="/preview" target="_blank" rel="noopener" class="flex items-center gap-2 border border-indigo-600 text-indigo-600 dark:text-indigo-300 px-3 py-2 rounded-lg hover:bg-indigo-50 dark:hover:bg-gray-800 transition-all">Open Tab</a>
            </div>
          </div>
          <p id="copyError" class="text-red-500 text-sm mb-2 hidden" role="status"></p>
          <div id="preview" class="bg-white dark:bg-gray-900 p-4 rounded-xl border overflow-y-auto max-h-[60vh]"></div>
        </div>
      </div>
    </main>

    <footer class="text-center py-6 text-gray-500 dark:text-gray-400 text-sm">
      AI PageCraft
    </footer>
  </div>

  <div id="modal" class="fixed inset-0 bg-black/80 flex items-center justify-center z-50 p-4 hidden">
    <div class="relative bg-white dark:bg-gray-900 rounded-2xl shadow-2xl p-6 w-full max-w-6xl h-[90vh] overflow-y-auto">
      <button id="closeModal" class="absolute top-4 right-4 text-2xl leading-none text-gray-600 dark:text-gray-300 hover:text-red-500" aria-label="Close">&times;</button>
      <div id="modalBody"></div>
    </div>
  </div>

  <script>
    const state = {
      idea: "",
      category: "AI SaaS",
      categories: [],
      status: "idle",
      document: "",
      error: "",
      copied: false,
      modal_visible: false,
      theme: "light",
    };
    let renderedDocument = null;
    let renderedModal = null;
    let copyResetTimer = null;
    let statusPollTimer = null;
    let generating = false;
    const STATUS_POLL_MS = 1000;

    async function apiGet(path) {
      const res = await fetch(path, { method: "GET" });
      const data = await res.json();
      if (!res.ok || !data.ok) {
        throw new Error(data.error || "request failed");
      }
      return data;
    }

    async function apiPost(path, body) {
      const res = await fetch(path, {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify(body || {}),
      });
      const data = await res.json();
      if (!res.ok || !data.ok) {
        throw new Error(data.error || "request failed");
      }
      return data;
    }

    function applySnapshot(payload) {
      for (const key of Object.keys(state)) {
        if (payload[key] !== undefined) {
          state[key] = payload[key];
        }
      }
      render();
      scheduleStatusPoll();
    }

    function scheduleStatusPoll() {
      if (statusPollTimer) {
        clearTimeout(statusPollTimer);
        statusPollTimer = null;
      }
      // A request started before this page loaded finishes elsewhere.
      if (state.status === "loading" && !generating) {
        statusPollTimer = setTimeout(() => {
          statusPollTimer = null;
          refresh();
        }, STATUS_POLL_MS);
      }
    }

    async function load() {
      try {
        applySnapshot(await apiGet("/app/init"));
      } catch (err) {
        showError(err.message);
      }
    }

    async function refresh() {
      try {
        applySnapshot(await apiGet("/app/state"));
      } catch (err) {
        showError(err.message);
      }
    }

    function showError(message) {
      const error = document.getElementById("error");
      error.textContent = message || "";
      error.classList.toggle("hidden", !message);
    }

    function showCopyError(message) {
      const copyError = document.getElementById("copyError");
      copyError.textContent = message || "";
      copyError.classList.toggle("hidden", !message);
    }

    function renderCategories() {
      const select = document.getElementById("category");
      if (select.options.length !== state.categories.length) {
        select.innerHTML = "";
        for (const label of state.categories) {
          const option = document.createElement("option");
          option.value = label;
          option.textContent = label;
          select.appendChild(option);
        }
      }
      select.value = state.category;
    }

    function render() {
      document.documentElement.classList.toggle("dark", state.theme === "dark");
      renderCategories();

      const ideaInput = document.getElementById("idea");
      if (document.activeElement !== ideaInput) {
        ideaInput.value = state.idea;
      }

      const loading = state.status === "loading";
      const generate = document.getElementById("generate");
      generate.disabled = loading;
      generate.innerHTML = loading
        ? '<span class="flex justify-center items-center gap-2"><span class="spinner"></span> Generating...</span>'
        : "Generate Landing Page";

      showError(state.status === "failed" ? state.error : "");

      const hasDocument = state.document !== "";
      document.getElementById("result").classList.toggle("hidden", !hasDocument);
      if (renderedDocument !== state.document) {
        document.getElementById("preview").innerHTML = state.document;
        renderedDocument = state.document;
      }

      document.getElementById("copy").textContent = state.copied ? "Copied!" : "Copy HTML";

      const showModal = hasDocument && state.modal_visible;
      document.getElementById("modal").classList.toggle("hidden", !showModal);
      const modalDocument = showModal ? state.document : "";
      if (renderedModal !== modalDocument) {
        document.getElementById("modalBody").innerHTML = modalDocument;
        renderedModal = modalDocument;
      }
    }

    function draft() {
      return {
        idea: document.getElementById("idea").value,
        category: document.getElementById("category").value,
      };
    }

    async function saveDraft() {
      try {
        applySnapshot(await apiPost("/app/idea", draft()));
      } catch (err) {
        showError(err.message);
      }
    }

    async function setModal(visible) {
      try {
        applySnapshot(await apiPost("/app/modal", { visible }));
      } catch (err) {
        showError(err.message);
      }
    }

    document.getElementById("idea").addEventListener("change", saveDraft);
    document.getElementById("category").addEventListener("change", saveDraft);

    document.getElementById("idea").addEventListener("keydown", (event) => {
      if (event.key === "Enter") {
        event.preventDefault();
        document.getElementById("generate").click();
      }
    });

    document.getElementById("generate").addEventListener("click", async () => {
      const body = draft();
      if (!body.idea.trim()) {
        alert("Please enter a product idea!");
        return;
      }
      if (state.status === "loading") {
        return;
      }

      state.status = "loading";
      state.document = "";
      state.error = "";
      state.modal_visible = false;
      showCopyError("");
      generating = true;
      render();

      try {
        const data = await apiPost("/app/generate", body);
        generating = false;
        applySnapshot(data);
      } catch (err) {
        generating = false;
        await refresh();
        if (state.status !== "failed") {
          showError(err.message);
        }
      }
    });

    document.getElementById("copy").addEventListener("click", async () => {
      if (!state.document) {
        return;
      }
      try {
        const data = await apiPost("/app/copy", {});
        applySnapshot(data);
        showCopyError("");
        if (data.copied) {
          if (copyResetTimer) {
            clearTimeout(copyResetTimer);
          }
          copyResetTimer = setTimeout(() => {
            copyResetTimer = null;
            refresh();
          }, data.reset_after_ms || 1500);
        }
      } catch (err) {
        showCopyError(err.message);
      }
    });

    document.getElementById("viewFull").addEventListener("click", () => setModal(true));
    document.getElementById("closeModal").addEventListener("click", () => setModal(false));
    document.addEventListener("keydown", (event) => {
      if (event.key === "Escape" && state.modal_visible) {
        setModal(false);
      }
    });

    document.getElementById("themeToggle").addEventListener("click", async () => {
      try {
        applySnapshot(await apiPost("/app/theme", {}));
      } catch (err) {
        showError(err.message);
      }
    });

    window.addEventListener("pagehide", () => {
      if (copyResetTimer) {
        clearTimeout(copyResetTimer);
        copyResetTimer = null;
      }
      if (statusPollTimer) {
        clearTimeout(statusPollTimer);
        statusPollTimer = null;
      }
    });

    load();
  </script>
</body>
</html>
"#;
