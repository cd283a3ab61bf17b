/*!

This is the long-form manual for `age_tally` and `credmap`.

## Input data

Two CSV files feed the panel:
* the accreditation roster, one row per institution
* the demographic declarations, one row per (age label, category) count

Headers are matched ignoring case, accents and punctuation, so `Faixa Etária`
and `faixa_etaria` name the same column. Column locations can also be forced
from the configuration file, see the [Configuration section](#configuration).

### Accreditation roster

One row per accredited institution. The recognized columns:

| column                   | content                              |
|--------------------------|--------------------------------------|
| `municipio`              | municipality name (mandatory)        |
| `nome`                   | institution name                     |
| `regiao`                 | administrative region                |
| `tipo`                   | accreditation kind, e.g. `CIPTEA`    |
| `endereco`               | street address                       |
| `telefone`               | contact phone                        |
| `email`                  | contact email                        |
| `quantidade_ciptea`      | CIPTEA cards issued                  |
| `quantidade_cipf`        | CIPF cards issued                    |
| `quantidade_passe_livre` | Passe Livre cards issued             |

A row carrying a `municipio` but no `nome` marks the municipality on the map
without any accreditation. Rows without a `municipio` are dropped.

### Demographic declarations

```text
faixa_etaria,tipo_deficiencia,quantidade
0-12,Auditiva,10
38-42,Visual,3
60+,Auditiva,7
```

`faixa` is accepted as an alternate header for the age label. Two label
shapes are understood: `a-b` (both years included) and `a+` (open-ended).
Records with a label in any other shape are left out of the tally and
reported at the end of the run; records with a blank or unparseable
quantity count as zero.

A label that does not line up with the reporting brackets is split
proportionally to the number of years it shares with each bracket. The
shares are rounded to whole persons and the rounding error is folded back
into the largest share, so the grand total always matches the input exactly.
Open-ended labels are never split.

## Reporting brackets

By default the counts are reported over four brackets:

```text
0-12, 13-17, 18-59, 60+
```

The list can be replaced from the configuration file, or discovered from the
distinct labels present in the data with `discoverBrackets`. In both cases
the brackets must be ordered and must not share any year.

## Configuration

`credmap` comes with sensible defaults but users may want to apply specific
rules (for example, a different set of reporting brackets). The program
accepts a configuration file in JSON:

```text
{
  "outputSettings": {
    "panelName": "Painel de Credenciamento",
    "panelDate": "2024-06-01",
    "jurisdiction": "Tocantins",
    "outputDirectory": "out"
  },
  "dataSources": {
    "institutions": { "filePath": "instituicoes.csv" },
    "demographics": { "filePath": "demografia.csv", "delimiter": ";" }
  },
  "brackets": [
    { "label": "0-17", "start": 0, "end": 17 },
    { "label": "18+", "start": 18 }
  ],
  "categories": ["Auditiva", "Fisica", "Intelectual", "Visual"]
}
```

Notes:
- `demographics` is optional: without it the panel only shows the map and
  the credential totals.
- a `FileSource` also accepts `bracketColumn`, `categoryColumn` and
  `quantityColumn` to point at columns whose headers do not match the usual
  names.
- `brackets` and `discoverBrackets` are mutually exclusive. A bracket
  without an `end` is open-ended and must come last.
- without `categories`, the category list is discovered from the data.
  Records with a blank category are reported under `Outra`.

 */
