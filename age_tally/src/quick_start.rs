/*!

# Quick start

This example runs a small panel end to end, starting from the two CSV files
that feed the dashboard. The files usually come out of an online spreadsheet
(Google Sheets, Microsoft 365) exported in the CSV format; any export works as
long as the first row carries the column names.

**The accreditation roster** One row per accredited institution. Create a
spreadsheet with the columns `municipio`, `nome`, `regiao`, `tipo` and the
credential counters, then export it as `instituicoes.csv`:

```text
municipio,nome,regiao,tipo,quantidade_ciptea,quantidade_cipf,quantidade_passe_livre
Palmas,Centro de Referência A,Norte,CIPTEA,12,3,5
Gurupi,Associação Sul,Sul,CIPTEA,4,1,0
Miracema,,,,,,
```

The accents and casing of the headers do not matter: `Município` and
`municipio` name the same column. A row with a municipality and no
institution, like `Miracema` above, marks the municipality on the map without
any accreditation.

**The demographic declarations** One row per (age label, disability type)
count, exported as `demografia.csv`:

```text
faixa_etaria,tipo_deficiencia,quantidade
0-12,Auditiva,10
13-17,Visual,3
60+,Auditiva,7
```

Run `credmap` on the two files:

```bash
credmap --institutions instituicoes.csv --demographics demografia.csv
```

After running this command, you should see the resolved reporting brackets
and the assembled summary:

```text
[2024-06-01T09:55:59Z INFO  age_tally] Processing 3 institution records
[2024-06-01T09:55:59Z INFO  age_tally] Processing 3 demographic records
[2024-06-01T09:55:59Z INFO  age_tally] Bracket 1: 0-12 [0..12]
[2024-06-01T09:55:59Z INFO  age_tally] Bracket 2: 13-17 [13..17]
[2024-06-01T09:55:59Z INFO  age_tally] Bracket 3: 18-59 [18..59]
[2024-06-01T09:55:59Z INFO  age_tally] Bracket 4: 60+ [60..]
summary:{
  "config": { ... },
  ...
}
```

Age labels that do not line up with the reporting brackets are split
proportionally, and labels that cannot be read at all (`adulto`) are
reported as skipped at the end of the run instead of stopping it.

**Writing the summary to a file** The summary is a single JSON document that
the dashboard rendering layer (charts and choropleth map) reads as is. Use
the `--out` flag to write it to a file:

```bash
credmap --institutions instituicoes.csv --demographics demografia.csv \
--out summary.json
```

It is the end of this quick start. You can explore the following sections:
- if your panel needs different reporting brackets, a fixed category list or
  inputs with unusual column names, check the documentation of the `--config`
  flag in the [configuration section](../manual/index.html#configuration).
- if you are feeding the tally from another program instead of a file, check
  the [builder API](../builder/index.html).

*/
