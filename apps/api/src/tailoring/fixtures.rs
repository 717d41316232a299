// Shared LaTeX fixtures for engine tests.

/// A complete resume in the supported single-file template.
pub const SAMPLE_RESUME: &str = r"\documentclass[letterpaper,11pt]{article}
\usepackage{fontawesome5}
\usepackage[hidelinks]{hyperref}
\usepackage{enumitem, titlesec}

\def \name {Jordan Rivera}
\def \subtitle {Software Engineer}

\newcommand{\resumeEntryStart}{\begin{itemize}[leftmargin=0pt]}
\newcommand{\resumeEntryEnd}{\end{itemize}}
\newcommand{\resumeEntryS}[2]{\item \textbf{#1}: #2}

\begin{document}

\section{\faUser}{Professional Summary}
Backend engineer with 5+ years of experience building \textbf{Go} services.

\section{\faCode}{Technical Proficiencies}
 \resumeEntryStart
  \resumeEntryS{Languages}{\textbf{Go}, \textbf{Rust}, Python}
  \resumeEntryS{Cloud}{AWS, Kubernetes}
 \resumeEntryEnd

\section{\faBriefcase}{Professional Experience}
 \resumeEntryStart
  \resumeEntryS{Acme Corp}{Built \textbf{payment} pipelines handling 10k rps.}
 \resumeEntryEnd

\section{\faGraduationCap}{Education}
B.S. Computer Science, \href{https://example.edu}{State University}

\end{document}
";
